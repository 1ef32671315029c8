//! Launch scripts.
//!
//! Every installation ends up with `start.bat` or `start.sh` in its root;
//! `mcserver start` and other tooling rely on that name.

use crate::config::Settings;
use crate::error::InstallError;
use crate::platform::Os;
use std::path::{Path, PathBuf};

/// Companion arguments file generated by modern Forge/NeoForge installers.
pub const USER_JVM_ARGS: &str = "user_jvm_args.txt";

/// Script name the installer generates for `os`.
fn generated_script(os: Os) -> &'static str {
    match os {
        Os::Windows => "run.bat",
        _ => "run.sh",
    }
}

/// Render the launch script for a directly runnable server jar.
pub fn render_launch_script(os: Os, java: &str, settings: &Settings, jar_name: &str) -> String {
    let mut command = format!("\"{}\" {} -jar \"{}\"", java, settings.heap_flags(), jar_name);
    if !settings.use_server_gui {
        command.push_str(" nogui");
    }

    match os {
        Os::Windows => format!("@echo off\r\n{}\r\npause\r\n", command),
        _ => format!("#!/bin/sh\ncd \"$(dirname \"$0\")\"\nexec {}\n", command),
    }
}

/// Write the launch script into `dir`, returning its path.
pub fn write_launch_script(
    dir: &Path,
    os: Os,
    java: &str,
    settings: &Settings,
    jar_name: &str,
) -> Result<PathBuf, InstallError> {
    let script = dir.join(os.launch_script());
    std::fs::write(&script, render_launch_script(os, java, settings, jar_name))?;
    make_executable(&script)?;
    Ok(script)
}

/// Bring an installer-generated layout in line with ours: memory flags go
/// into `user_jvm_args.txt` and `run.*` becomes `start.*`.
pub fn adapt_installer_scripts(dir: &Path, settings: &Settings, os: Os) -> Result<PathBuf, InstallError> {
    let expected = generated_script(os);
    if !dir.join(expected).is_file() {
        return Err(InstallError::UnsupportedInstallerOutput {
            expected: expected.to_string(),
            dir: dir.to_path_buf(),
        });
    }

    let jvm_args = dir.join(USER_JVM_ARGS);
    if jvm_args.is_file() {
        std::fs::write(
            &jvm_args,
            format!(
                "# Generated by mcserver\n-Xmx{}M\n-Xms{}M\n",
                settings.max_ram_mb, settings.min_ram_mb
            ),
        )?;
    }

    // Installers usually emit both scripts; keep both under the canonical names.
    for (from, to) in [("run.bat", "start.bat"), ("run.sh", "start.sh")] {
        let generated = dir.join(from);
        if generated.is_file() {
            let canonical = dir.join(to);
            std::fs::rename(&generated, &canonical)?;
            make_executable(&canonical)?;
            tracing::debug!("Renamed {} to {}", from, to);
        }
    }

    Ok(dir.join(os.launch_script()))
}

fn make_executable(path: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if path.extension().and_then(|e| e.to_str()) == Some("sh") {
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))?;
        }
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            min_ram_mb: 512,
            max_ram_mb: 4096,
            ..Settings::default()
        }
    }

    #[test]
    fn test_render_batch_script() {
        let script = render_launch_script(Os::Windows, "C:\\jdk\\bin\\java.exe", &settings(), "server.jar");
        assert_eq!(
            script,
            "@echo off\r\n\"C:\\jdk\\bin\\java.exe\" -Xms512M -Xmx4096M -jar \"server.jar\" nogui\r\npause\r\n"
        );
    }

    #[test]
    fn test_render_shell_script_with_gui() {
        let mut settings = settings();
        settings.use_server_gui = true;
        let script = render_launch_script(Os::Linux, "java", &settings, "server.jar");
        assert!(script.starts_with("#!/bin/sh\n"));
        assert!(script.contains("exec \"java\" -Xms512M -Xmx4096M -jar \"server.jar\"\n"));
        assert!(!script.contains("nogui"));
    }

    #[cfg(unix)]
    #[test]
    fn test_written_shell_script_is_executable() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let path = write_launch_script(tmp.path(), Os::Linux, "java", &settings(), "server.jar").unwrap();
        assert_eq!(path, tmp.path().join("start.sh"));
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn test_adapt_renames_and_rewrites_jvm_args() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("run.sh"), "#!/bin/sh\njava @user_jvm_args.txt\n").unwrap();
        std::fs::write(tmp.path().join("run.bat"), "java @user_jvm_args.txt\r\n").unwrap();
        std::fs::write(tmp.path().join(USER_JVM_ARGS), "# -Xmx4G\n").unwrap();

        let script = adapt_installer_scripts(tmp.path(), &settings(), Os::Linux).unwrap();
        assert_eq!(script, tmp.path().join("start.sh"));
        assert!(tmp.path().join("start.sh").exists());
        assert!(tmp.path().join("start.bat").exists());
        assert!(!tmp.path().join("run.sh").exists());
        assert!(!tmp.path().join("run.bat").exists());
        assert_eq!(
            std::fs::read_to_string(tmp.path().join(USER_JVM_ARGS)).unwrap(),
            "# Generated by mcserver\n-Xmx4096M\n-Xms512M\n"
        );
    }

    #[test]
    fn test_adapt_without_jvm_args_leaves_it_absent() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("run.bat"), "java\r\n").unwrap();

        adapt_installer_scripts(tmp.path(), &settings(), Os::Windows).unwrap();
        assert!(tmp.path().join("start.bat").exists());
        assert!(!tmp.path().join(USER_JVM_ARGS).exists());
    }

    #[test]
    fn test_adapt_missing_generated_script() {
        let tmp = tempfile::tempdir().unwrap();
        // Only the script for the other platform was generated.
        std::fs::write(tmp.path().join("run.bat"), "java\r\n").unwrap();

        let err = adapt_installer_scripts(tmp.path(), &settings(), Os::Linux).unwrap_err();
        match err {
            InstallError::UnsupportedInstallerOutput { expected, .. } => assert_eq!(expected, "run.sh"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(tmp.path().join("run.bat").exists());
    }
}
