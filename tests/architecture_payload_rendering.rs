use std::fs;
use std::path::{Path, PathBuf};

// Payloads must be rendered where the fee policy and builder address are known.
const ALLOWED_PAYLOAD_RENDERERS: &[&str] = &[
    "src/domain/order.rs",
    "src/exchange/payload.rs",
    "src/services/pipeline.rs",
];

fn collect_rust_files(root: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(root) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_rust_files(&path, out);
            continue;
        }
        if path.extension().and_then(|s| s.to_str()) == Some("rs") {
            out.push(path);
        }
    }
}

#[test]
fn to_payload_calls_are_limited_to_fee_aware_modules() {
    let repo_root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let src_root = repo_root.join("src");
    let mut files = Vec::new();
    collect_rust_files(&src_root, &mut files);

    let mut offenders = Vec::new();
    for file in files {
        let rel = file
            .strip_prefix(repo_root)
            .unwrap_or(&file)
            .to_string_lossy()
            .replace('\\', "/");
        if ALLOWED_PAYLOAD_RENDERERS.contains(&rel.as_str()) {
            continue;
        }
        let content = fs::read_to_string(&file).unwrap_or_default();
        for (idx, line) in content.lines().enumerate() {
            if line.contains(".to_payload(") {
                offenders.push(format!("{rel}:{}", idx + 1));
            }
        }
    }

    assert!(
        offenders.is_empty(),
        "render payloads through OrderPipeline::payload or build_order_payload:\n{}",
        offenders.join("\n")
    );
}
