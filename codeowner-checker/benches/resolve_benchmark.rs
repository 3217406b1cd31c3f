use codeowner_checker::{resolve, OwnershipFile, ResolutionQuery};
use criterion::{criterion_group, criterion_main, Criterion};

const TEST_PATHS: &[&str] = &[
    "file-a",
    "dir-a/file-a",
    "dir-a/dir-c/file-a",
    "dir-a/dir-c/file-b.rs",
    "dir-b/file-a.md",
    "dir-b/dir-d/dir-e/dir-f/dir-g/file-a",
];

const TEST_SOURCE: &str = "\
# generated
.*-a$ @team-a @team-b
file- @files
^dir-b/ @dir-b
dir-a/dir-b @nested
\\.rs$ @rust
\\.md$ @docs
dir-[a-z]/.* @dirs
dir-b/dir-d/dir-e/dir-f/dir-g/file-a @deep
* @fallback
";

fn build_files() -> Vec<OwnershipFile> {
    vec![
        OwnershipFile::parse("dir-a", TEST_SOURCE),
        OwnershipFile::parse("dir-b", TEST_SOURCE),
        OwnershipFile::parse("", TEST_SOURCE),
    ]
}

fn resolve_benchmark(c: &mut Criterion) {
    c.bench_function("parsing", |b| b.iter(build_files));

    let files = build_files();
    c.bench_function("resolving", |b| {
        b.iter(|| {
            for p in TEST_PATHS {
                resolve(&ResolutionQuery::new(p, Some("@fallback")), &files);
            }
        })
    });
}

criterion_group!(benches, resolve_benchmark);
criterion_main!(benches);
