/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::fs;
use std::path::Path;

use log::warn;

/// Resolves `name` inside the sandbox and makes sure its parent directory exists.
///
/// `name` is appended verbatim, so fixtures pass names with a leading separator, e.g.
/// `/local/resource.html`. A failure to create the directories is logged and the path
/// is returned anyway; the fixture will notice when it tries to use it.
pub fn path_to_local_resource(sandbox_root: &Path, name: &str) -> String {
    let full_path = format!("{}{}", sandbox_root.display(), name);
    if let Some(parent) = Path::new(&full_path).parent() {
        if let Err(error) = fs::create_dir_all(parent) {
            warn!("Could not create {}: {error}", parent.display());
        }
    }
    full_path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_parent_directories() {
        let sandbox = tempfile::tempdir().unwrap();
        let path = path_to_local_resource(sandbox.path(), "/a/b/c/resource.html");

        assert_eq!(
            path,
            format!("{}/a/b/c/resource.html", sandbox.path().display())
        );
        assert!(sandbox.path().join("a/b/c").is_dir());
        assert!(!sandbox.path().join("a/b/c/resource.html").exists());
    }

    #[test]
    fn name_is_appended_without_a_separator() {
        let sandbox = tempfile::tempdir().unwrap();
        let path = path_to_local_resource(sandbox.path(), "-suffix");
        assert_eq!(path, format!("{}-suffix", sandbox.path().display()));
    }

    #[test]
    fn unwritable_root_still_returns_the_path() {
        let sandbox = tempfile::tempdir().unwrap();
        let blocker = sandbox.path().join("file");
        fs::write(&blocker, b"").unwrap();

        let path = path_to_local_resource(&blocker, "/nested/resource.html");
        assert_eq!(path, format!("{}/nested/resource.html", blocker.display()));
        assert!(!blocker.join("nested").exists());
    }
}
