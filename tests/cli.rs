use assert_cmd::Command;
use predicates::prelude::*;

fn jre_provision() -> Command {
    Command::cargo_bin("jre-provision").unwrap()
}

#[test]
fn url_for_linux_x64() {
    jre_provision()
        .args(["--os", "linux", "--arch", "x64", "url"])
        .assert()
        .success()
        .stdout(predicate::str::ends_with(
            "/GPL/openjdk-11.0.2_linux-x64_bin.tar.gz\n",
        ));
}

#[test]
fn url_for_win32_ia32() {
    jre_provision()
        .args(["--os", "win32", "--arch", "ia32", "url"])
        .assert()
        .success()
        .stdout(predicate::str::contains("openjdk-11.0.2_windows-i586_bin.zip"));
}

#[test]
fn unsupported_platform_exits_non_zero() {
    jre_provision()
        .args(["--os", "sunos", "--arch", "x64", "url"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported platform: sunos"));
}

#[test]
fn unsupported_arch_exits_non_zero() {
    jre_provision()
        .args(["--os", "linux", "--arch", "mips", "url"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported architecture: mips"));
}

#[test]
fn locate_without_install_fails() {
    let dir = tempfile::tempdir().unwrap();
    jre_provision()
        .args(["--os", "linux", "--arch", "x64", "locate"])
        .arg("--install-dir")
        .arg(dir.path().join("jre"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("no jre found"));
}

#[cfg(unix)]
#[test]
fn locate_prints_executable() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("jdk-11.0.2");
    std::fs::create_dir_all(root.join("bin")).unwrap();

    jre_provision()
        .args(["--os", "linux", "--arch", "x64", "locate"])
        .arg("--install-dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("jdk-11.0.2/bin/java"));
}

#[test]
fn clean_removes_install_dir() {
    let dir = tempfile::tempdir().unwrap();
    let install = dir.path().join("jre");
    std::fs::create_dir_all(install.join("jdk/bin")).unwrap();
    std::fs::write(install.join("jdk/bin/java"), b"1234").unwrap();

    jre_provision()
        .args(["--os", "linux", "--arch", "x64", "clean"])
        .arg("--install-dir")
        .arg(&install)
        .assert()
        .success()
        .stderr(predicate::str::contains("Removed 4 B"));
    assert!(!install.exists());
}

#[test]
fn info_reports_install_dir_and_missing_runtime() {
    let dir = tempfile::tempdir().unwrap();
    let jre = dir.path().join("jre");
    jre_provision()
        .args(["--os", "darwin", "--arch", "x64", "info"])
        .arg("--install-dir")
        .arg(&jre)
        .assert()
        .success()
        .stderr(predicate::str::contains(format!(
            "Install directory: {}",
            jre.display()
        )))
        .stderr(predicate::str::contains("Installed java:    none"));
}
