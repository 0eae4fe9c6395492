//! Build command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn template_writes_dockerfile() {
  let env = TestEnv::with_fixture("scipy.yaml", "environment.yaml");

  env
    .condock_cmd()
    .args(["build", "--template"])
    .assert()
    .success()
    .stdout(predicate::str::contains("building Dockerfile dockerfiles/Dockerfile-scipy ...."))
    .stdout(predicate::str::contains("Generated dockerfiles/Dockerfile-scipy"));

  let dockerfile = env.read_file("dockerfiles/Dockerfile-scipy");
  assert!(dockerfile.starts_with("\nFROM jupyter/minimal-notebook:7a0c7325e470\n"));
  assert!(dockerfile.contains("COPY environment.yaml /tmp/environment.yaml"));
  assert!(dockerfile.contains("python -m ipykernel install --name scipy --display scipy"));
}

#[test]
fn template_is_stable_across_runs() {
  let env = TestEnv::with_fixture("scipy.yaml", "environment.yaml");

  env.condock_cmd().args(["build", "--template"]).assert().success();
  let first = env.read_file("dockerfiles/Dockerfile-scipy");

  env.condock_cmd().args(["build", "--template"]).assert().success();
  let second = env.read_file("dockerfiles/Dockerfile-scipy");

  assert_eq!(first, second);
}

#[test]
fn config_option_selects_environment_file() {
  let env = TestEnv::with_fixture("geo.yaml", "envs/geo.yaml");

  env
    .condock_cmd()
    .args(["build", "--template", "--config", "envs/geo.yaml"])
    .assert()
    .success();

  assert!(env.read_file("dockerfiles/Dockerfile-geo").contains("COPY envs/geo.yaml /tmp/environment.yaml"));
}

#[test]
fn output_dir_flag_moves_dockerfiles() {
  let env = TestEnv::with_fixture("scipy.yaml", "environment.yaml");

  env
    .condock_cmd()
    .args(["--output-dir", "generated", "build", "--template"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Generated generated/Dockerfile-scipy"));

  assert!(env.path("generated/Dockerfile-scipy").exists());
  assert!(!env.path("dockerfiles").exists());
}

#[test]
fn context_from_environment_variable() {
  let env = TestEnv::with_fixture("scipy.yaml", "project/environment.yaml");

  env
    .condock_cmd()
    .env("CONDOCK_CONTEXT", env.path("project"))
    .args(["build", "--template", "--config", "project/environment.yaml"])
    .assert()
    .success();

  let dockerfile = env.read_file("project/dockerfiles/Dockerfile-scipy");
  assert!(dockerfile.contains("COPY environment.yaml /tmp/environment.yaml"));
}

#[test]
fn supplied_dockerfile_is_not_regenerated() {
  let env = TestEnv::with_fixture("scipy.yaml", "environment.yaml");
  env.write_file("Dockerfile.custom", "FROM scratch\n");

  env
    .condock_cmd()
    .args(["build", "--template", "--dockerfile", "Dockerfile.custom"])
    .assert()
    .success()
    .stdout(predicate::str::contains("building Dockerfile Dockerfile.custom ...."));

  assert_eq!(env.read_file("Dockerfile.custom"), "FROM scratch\n");
  assert!(!env.path("dockerfiles/Dockerfile-scipy").exists());
  assert!(env.path("dockerfiles").is_dir());
}

#[test]
fn missing_name_fails() {
  let env = TestEnv::with_fixture("nameless.yaml", "environment.yaml");

  env
    .condock_cmd()
    .args(["build", "--template"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("has no `name` field"));

  assert!(!env.path("dockerfiles").exists());
}

#[test]
fn malformed_environment_fails() {
  let env = TestEnv::empty();
  env.write_file("environment.yaml", "name: [unclosed\n");

  env
    .condock_cmd()
    .args(["build", "--template"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("failed to parse environment file"));
}

#[test]
fn unreachable_daemon_fails_after_generating() {
  let env = TestEnv::with_fixture("scipy.yaml", "environment.yaml");

  env
    .condock_cmd()
    .arg("build")
    .assert()
    .failure()
    .stdout(predicate::str::contains("building Dockerfile dockerfiles/Dockerfile-scipy ...."))
    .stderr(predicate::str::contains("Failed to build environment.yaml"));

  assert!(env.path("dockerfiles/Dockerfile-scipy").exists());
}

#[test]
fn unsupported_docker_host_fails() {
  let env = TestEnv::with_fixture("scipy.yaml", "environment.yaml");

  env
    .condock_cmd()
    .args(["--docker-host", "tcp://127.0.0.1:2375", "build"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("unsupported engine host"));
}

#[test]
fn template_ignores_docker_host() {
  let env = TestEnv::with_fixture("scipy.yaml", "environment.yaml");

  env
    .condock_cmd()
    .args(["--docker-host", "tcp://127.0.0.1:2375", "build", "--template"])
    .assert()
    .success();
}
