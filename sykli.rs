//! Sykli CI pipeline for deployconfig-defaults
//!
//! Run locally: sykli run
//! Or: cargo run --bin sykli --features sykli -- --emit | sykli run -

use sykli::{Condition, Pipeline, Template};

fn main() {
    let mut p = Pipeline::new();

    // === RESOURCES ===
    let src = p.dir(".");
    let cargo_registry = p.cache("cargo-registry");
    let cargo_git = p.cache("cargo-git");
    let target_cache = p.cache("target");

    // === TEMPLATE ===
    let rust = Template::new()
        .container("rust:1.85")
        .mount_dir(&src, "/src")
        .mount_cache(&cargo_registry, "/usr/local/cargo/registry")
        .mount_cache(&cargo_git, "/usr/local/cargo/git")
        .mount_cache(&target_cache, "/src/target")
        .workdir("/src");

    // === TASKS ===

    let _ = p
        .task("test")
        .from(&rust)
        .run("cargo test")
        .inputs(&["**/*.rs", "Cargo.toml", "Cargo.lock"]);

    let _ = p
        .task("lint")
        .from(&rust)
        .run("cargo clippy --all-targets -- -D warnings")
        .inputs(&["**/*.rs", "Cargo.toml", "Cargo.lock"]);

    let _ = p
        .task("fmt")
        .from(&rust)
        .run("cargo fmt -- --check")
        .inputs(&["**/*.rs"]);

    let _ = p
        .task("build")
        .from(&rust)
        .run("cargo build --release --bin deployconfig-apiserver")
        .inputs(&["**/*.rs", "Cargo.toml", "Cargo.lock"])
        .output("binary", "target/release/deployconfig-apiserver")
        .after(&["test", "lint", "fmt"]);

    // Smoke test: the same object through both surfaces, only the group
    // surface may add revisionHistoryLimit
    let _ = p
        .task("smoke-test")
        .from(&rust)
        .run(
            r#"#!/bin/bash
set -e

RUST_LOG=info ./target/release/deployconfig-apiserver 2>&1 | tee /tmp/apiserver-log.txt &
SERVER_PID=$!

for i in $(seq 1 20); do
  curl -sf http://127.0.0.1:8080/readyz && break
  sleep 0.5
done

BODY='{"kind":"DeploymentConfig","metadata":{"name":"NAME"},"spec":{"selector":{"app":"smoke"},"template":{"metadata":{"labels":{"app":"smoke"}},"spec":{"containers":[{"name":"a","image":"nginx"}]}}}}'

LEGACY=$(echo "$BODY" | sed 's/NAME/legacy/' | curl -sf -X POST -H 'content-type: application/json' \
  --data @- http://127.0.0.1:8080/oapi/v1/namespaces/smoke/deploymentconfigs)
GROUP=$(echo "$BODY" | sed 's/NAME/group/' | curl -sf -X POST -H 'content-type: application/json' \
  --data @- http://127.0.0.1:8080/apis/apps.openshift.io/v1/namespaces/smoke/deploymentconfigs)

if echo "$LEGACY" | grep -q revisionHistoryLimit; then
  echo "ERROR: legacy surface defaulted revisionHistoryLimit"
  cat /tmp/apiserver-log.txt
  exit 1
fi
if ! echo "$GROUP" | grep -q '"revisionHistoryLimit":10'; then
  echo "ERROR: group surface did not default revisionHistoryLimit to 10"
  cat /tmp/apiserver-log.txt
  exit 1
fi

STATUS=$(curl -s -o /dev/null -w '%{http_code}' http://127.0.0.1:8080/apis/apps.example.com/v1/namespaces/smoke/deploymentconfigs)
if [ "$STATUS" != "404" ]; then
  echo "ERROR: unrecognized surface should return 404, got $STATUS"
  exit 1
fi

echo "Smoke tests passed"
kill -TERM $SERVER_PID
wait $SERVER_PID || true
"#,
        )
        .input_from("build", "binary", "/src/target/release/deployconfig-apiserver")
        .when_cond(Condition::event("push").or(Condition::negate(Condition::branch("*"))))
        .timeout(300);

    p.emit();
}
