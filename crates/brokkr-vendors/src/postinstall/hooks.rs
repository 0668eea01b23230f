//! Built-in post-install hooks
//!
//! Each hook follows the shared shape: flatten a single nested
//! subdirectory, create portable state outside the extract tree, write the
//! config files that point the tool at it, then probe the tool's version.
//! Config contents are deterministic for a given state path, which is what
//! makes reruns byte-identical.

use super::{flatten_single_subdir, probe_version, write_config, HookContext, PostInstallHook};
use async_trait::async_trait;
use brokkr_core::Result;
use std::fs;

/// Flatten-only hook for vendors with no specific configuration
pub struct DefaultHook;

#[async_trait]
impl PostInstallHook for DefaultHook {
    fn name(&self) -> &'static str {
        "default"
    }

    async fn run(&self, ctx: &HookContext) -> Result<()> {
        flatten_single_subdir(&ctx.extract_dir)?;
        probe_version(&ctx.executable, &["--version"]).await;
        Ok(())
    }
}

/// Git: portable global config under the state directory
///
/// The launcher points GIT_CONFIG_GLOBAL at the written file; nothing
/// inside the extract tree holds user state.
pub struct GitHook;

#[async_trait]
impl PostInstallHook for GitHook {
    fn name(&self) -> &'static str {
        "git"
    }

    async fn run(&self, ctx: &HookContext) -> Result<()> {
        flatten_single_subdir(&ctx.extract_dir)?;

        let home = ctx.state_dir.join("home");
        fs::create_dir_all(&home)?;

        let gitconfig = "[core]\n\
             \tautocrlf = false\n\
             [init]\n\
             \tdefaultBranch = main\n\
             [credential]\n\
             \thelper = manager\n";
        write_config(&home.join(".gitconfig"), gitconfig)?;

        probe_version(&ctx.executable, &["--version"]).await;
        Ok(())
    }
}

/// Node.js: npm cache and global prefix outside the extract tree
pub struct NodeHook;

#[async_trait]
impl PostInstallHook for NodeHook {
    fn name(&self) -> &'static str {
        "node"
    }

    async fn run(&self, ctx: &HookContext) -> Result<()> {
        flatten_single_subdir(&ctx.extract_dir)?;

        let cache = ctx.state_dir.join("npm-cache");
        let prefix = ctx.state_dir.join("npm-global");
        fs::create_dir_all(&cache)?;
        fs::create_dir_all(&prefix)?;

        // npm's builtin config; read before any user npmrc
        let npmrc = format!(
            "prefix={}\ncache={}\nupdate-notifier=false\n",
            prefix.display(),
            cache.display()
        );
        write_config(&ctx.extract_dir.join("etc").join("npmrc"), &npmrc)?;

        probe_version(&ctx.executable, &["--version"]).await;
        Ok(())
    }
}

/// Python: pip cache and install prefix outside the extract tree
pub struct PythonHook;

#[async_trait]
impl PostInstallHook for PythonHook {
    fn name(&self) -> &'static str {
        "python"
    }

    async fn run(&self, ctx: &HookContext) -> Result<()> {
        flatten_single_subdir(&ctx.extract_dir)?;

        let cache = ctx.state_dir.join("pip-cache");
        let prefix = ctx.state_dir.join("packages");
        fs::create_dir_all(&cache)?;
        fs::create_dir_all(&prefix)?;

        let pip_ini = format!(
            "[global]\ncache-dir = {}\n[install]\nprefix = {}\n",
            cache.display(),
            prefix.display()
        );
        write_config(&ctx.extract_dir.join("pip.ini"), &pip_ini)?;

        probe_version(&ctx.executable, &["--version"]).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn context(temp: &TempDir, vendor: &str) -> HookContext {
        let extract_dir = temp.path().join("vendors").join(vendor);
        fs::create_dir_all(&extract_dir).unwrap();
        HookContext {
            vendor_id: vendor.to_string(),
            extract_dir: extract_dir.clone(),
            state_dir: temp.path().join("state").join(vendor),
            executable: extract_dir.join("missing.exe"),
        }
    }

    #[tokio::test]
    async fn test_node_hook_writes_npmrc() {
        let temp = TempDir::new().unwrap();
        let ctx = context(&temp, "node");

        NodeHook.run(&ctx).await.unwrap();

        let npmrc = fs::read_to_string(ctx.extract_dir.join("etc").join("npmrc")).unwrap();
        assert!(npmrc.contains("npm-global"));
        assert!(npmrc.contains("npm-cache"));
        assert!(ctx.state_dir.join("npm-cache").is_dir());
        assert!(ctx.state_dir.join("npm-global").is_dir());
    }

    #[tokio::test]
    async fn test_hooks_are_idempotent() {
        let temp = TempDir::new().unwrap();
        let ctx = context(&temp, "node");

        NodeHook.run(&ctx).await.unwrap();
        let npmrc_path = ctx.extract_dir.join("etc").join("npmrc");
        let first = fs::read(&npmrc_path).unwrap();

        NodeHook.run(&ctx).await.unwrap();
        let second = fs::read(&npmrc_path).unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_git_hook_state_outside_extract_tree() {
        let temp = TempDir::new().unwrap();
        let ctx = context(&temp, "git");

        GitHook.run(&ctx).await.unwrap();

        let gitconfig: PathBuf = ctx.state_dir.join("home").join(".gitconfig");
        assert!(gitconfig.is_file());
        assert!(!gitconfig.starts_with(&ctx.extract_dir));
    }

    #[tokio::test]
    async fn test_python_hook_writes_pip_ini() {
        let temp = TempDir::new().unwrap();
        let ctx = context(&temp, "python");

        PythonHook.run(&ctx).await.unwrap();

        let pip_ini = fs::read_to_string(ctx.extract_dir.join("pip.ini")).unwrap();
        assert!(pip_ini.starts_with("[global]"));
        assert!(pip_ini.contains("pip-cache"));
    }

    #[tokio::test]
    async fn test_default_hook_flattens() {
        let temp = TempDir::new().unwrap();
        let ctx = context(&temp, "tool");
        let nested = ctx.extract_dir.join("tool-9.0");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("tool.exe"), b"x").unwrap();

        DefaultHook.run(&ctx).await.unwrap();
        assert!(ctx.extract_dir.join("tool.exe").is_file());
    }
}
