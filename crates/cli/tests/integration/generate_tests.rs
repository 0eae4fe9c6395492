//! generate-images command integration tests.

use predicates::prelude::*;

use super::common::{TestEnv, fixture_content};

fn env_with_directory() -> TestEnv {
  let env = TestEnv::empty();
  env.write_file("environments/scipy.yaml", &fixture_content("scipy.yaml"));
  env.write_file("environments/geo.yaml", &fixture_content("geo.yaml"));
  env.write_file("environments/README.txt", "not an environment");
  env
}

#[test]
fn template_generates_every_environment() {
  let env = env_with_directory();

  env
    .condock_cmd()
    .args(["generate-images", "--template"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Done...").count(2))
    .stdout(predicate::str::contains("Generated dockerfiles/Dockerfile-geo"))
    .stdout(predicate::str::contains("Generated dockerfiles/Dockerfile-scipy"));

  assert!(
    env
      .read_file("dockerfiles/Dockerfile-geo")
      .contains("COPY environments/geo.yaml /tmp/environment.yaml")
  );
  assert!(env.path("dockerfiles/Dockerfile-scipy").exists());
}

#[test]
fn dirname_option_selects_directory() {
  let env = TestEnv::empty();
  env.write_file("kernels/scipy.yaml", &fixture_content("scipy.yaml"));

  env
    .condock_cmd()
    .args(["generate-images", "--template", "--dirname", "kernels"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Done...").count(1));

  assert!(
    env
      .read_file("dockerfiles/Dockerfile-scipy")
      .contains("COPY kernels/scipy.yaml /tmp/environment.yaml")
  );
}

#[test]
fn empty_directory_warns() {
  let env = TestEnv::empty();
  std::fs::create_dir_all(env.path("environments")).unwrap();

  env
    .condock_cmd()
    .args(["generate-images", "--template"])
    .assert()
    .success()
    .stderr(predicate::str::contains("No environment files found"));
}

#[test]
fn invalid_environment_aborts_batch() {
  let env = TestEnv::empty();
  env.write_file("environments/a.yaml", &fixture_content("nameless.yaml"));
  env.write_file("environments/b.yaml", &fixture_content("scipy.yaml"));

  env
    .condock_cmd()
    .args(["generate-images", "--template"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("has no `name` field"));

  assert!(!env.path("dockerfiles/Dockerfile-scipy").exists());
}

#[test]
fn unreachable_daemon_aborts_batch() {
  let env = env_with_directory();

  env
    .condock_cmd()
    .arg("generate-images")
    .assert()
    .failure()
    .stdout(predicate::str::contains("Done...").not());

  assert!(env.path("dockerfiles/Dockerfile-geo").exists());
  assert!(!env.path("dockerfiles/Dockerfile-scipy").exists());
}
