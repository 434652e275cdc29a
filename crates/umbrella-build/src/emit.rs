//! Artifact emission
//!
//! Writes the manifest and the framework bundle skeletons for a packaged
//! artifact. Each file is rendered by a pure function so the layouts can be
//! checked without touching the filesystem.

use crate::error::{BuildError, BuildResult};
use crate::packager::{AndroidLibrary, ArtifactDescriptor, FrameworkSlice};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Manifest file name inside the output directory
pub const MANIFEST_FILE: &str = "artifact.json";

/// Writes packaged artifacts to an output directory
pub struct ArtifactWriter {
    out_dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Write every file of the artifact, returning the paths written
    ///
    /// Slices, podspecs and Android output left by an earlier build that the
    /// artifact no longer lists are removed first.
    pub fn write(&self, artifact: &ArtifactDescriptor) -> BuildResult<Vec<PathBuf>> {
        self.prune_stale(artifact)?;
        let mut written = Vec::new();

        for slice in &artifact.frameworks {
            written.extend(self.write_framework(artifact, slice)?);
        }

        if artifact.has_apple_slices() {
            let podspec = self.out_dir.join(format!("{}.podspec", artifact.base_name));
            self.write_file(&podspec, &render_podspec(artifact))?;
            written.push(podspec);
        }

        if let Some(android) = &artifact.android {
            let manifest = self
                .out_dir
                .join(&android.path)
                .join("AndroidManifest.xml");
            self.write_file(&manifest, &render_android_manifest(android))?;
            written.push(manifest);
        }

        let manifest = self.out_dir.join(MANIFEST_FILE);
        self.write_file(&manifest, &artifact.to_json()?)?;
        written.push(manifest);

        info!(
            artifact = %artifact.framework_name(),
            out_dir = %self.out_dir.display(),
            files = written.len(),
            "wrote artifact"
        );
        Ok(written)
    }

    /// Remove the output directory
    pub fn clean(&self) -> BuildResult<()> {
        if self.out_dir.exists() {
            fs::remove_dir_all(&self.out_dir).map_err(|e| BuildError::io(&self.out_dir, e))?;
        }
        Ok(())
    }

    fn prune_stale(&self, artifact: &ArtifactDescriptor) -> BuildResult<()> {
        let keep: HashSet<PathBuf> = artifact
            .frameworks
            .iter()
            .flat_map(|slice| slice.path.ancestors().map(Path::to_path_buf))
            .collect();
        self.prune_dir(Path::new("ios"), &keep)?;

        if artifact.android.is_none() {
            remove_path(&self.out_dir.join("android"))?;
        }

        let podspec = format!("{}.podspec", artifact.base_name);
        for entry in read_dir(&self.out_dir)? {
            let name = entry.file_name();
            let is_podspec = Path::new(&name).extension().is_some_and(|ext| ext == "podspec");
            if is_podspec && (!artifact.has_apple_slices() || name != podspec.as_str()) {
                remove_path(&entry.path())?;
            }
        }
        Ok(())
    }

    /// Remove everything under `relative` that is not a listed slice or one
    /// of its parents
    fn prune_dir(&self, relative: &Path, keep: &HashSet<PathBuf>) -> BuildResult<()> {
        for entry in read_dir(&self.out_dir.join(relative))? {
            let child = relative.join(entry.file_name());
            if !keep.contains(&child) {
                debug!(path = %child.display(), "removing stale output");
                remove_path(&entry.path())?;
            } else if !child.extension().is_some_and(|ext| ext == "framework") {
                self.prune_dir(&child, keep)?;
            }
        }
        Ok(())
    }

    fn write_framework(
        &self,
        artifact: &ArtifactDescriptor,
        slice: &FrameworkSlice,
    ) -> BuildResult<Vec<PathBuf>> {
        let bundle = self.out_dir.join(&slice.path);
        let files = [
            (bundle.join("Info.plist"), render_info_plist(artifact, slice)),
            (
                bundle
                    .join("Headers")
                    .join(format!("{}.h", artifact.base_name)),
                render_umbrella_header(artifact),
            ),
            (
                bundle.join("Modules").join("module.modulemap"),
                render_modulemap(artifact),
            ),
        ];

        let mut written = Vec::with_capacity(files.len());
        for (path, content) in files {
            self.write_file(&path, &content)?;
            written.push(path);
        }
        Ok(written)
    }

    fn write_file(&self, path: &Path, content: &str) -> BuildResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
        }
        fs::write(path, content).map_err(|e| BuildError::io(path, e))
    }
}

/// Bundle `Info.plist` for one slice
pub fn render_info_plist(artifact: &ArtifactDescriptor, slice: &FrameworkSlice) -> String {
    let mut entries = vec![
        ("CFBundleExecutable", artifact.base_name.clone()),
        (
            "CFBundleIdentifier",
            format!("org.umbrella.{}", artifact.base_name),
        ),
        ("CFBundleName", artifact.base_name.clone()),
        ("CFBundlePackageType", "FMWK".to_string()),
        ("CFBundleShortVersionString", artifact.version.to_string()),
        (
            "CFBundleVersion",
            format!(
                "{}.{}.{}",
                artifact.version.major, artifact.version.minor, artifact.version.patch
            ),
        ),
    ];
    if let Some(sdk) = slice.target.sdk() {
        entries.push(("DTPlatformName", sdk.to_string()));
    }
    if let Some(minimum_os) = artifact.minimum_os {
        entries.push(("MinimumOSVersion", minimum_os.to_string()));
    }

    let mut plist = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" \
         \"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">\n\
         <plist version=\"1.0\">\n<dict>\n",
    );
    for (key, value) in entries {
        plist.push_str(&format!(
            "\t<key>{}</key>\n\t<string>{}</string>\n",
            key,
            xml_escape(&value)
        ));
    }
    plist.push_str("</dict>\n</plist>\n");
    plist
}

/// Umbrella header importing every re-exported module
pub fn render_umbrella_header(artifact: &ArtifactDescriptor) -> String {
    let mut header = format!(
        "// {} {} ({} framework)\n\n#import <Foundation/Foundation.h>\n",
        artifact.base_name, artifact.version, artifact.linkage
    );
    if !artifact.exports.is_empty() {
        header.push('\n');
    }
    for export in &artifact.exports {
        header.push_str(&format!("#import <{}/{}.h>\n", artifact.base_name, export));
    }
    header
}

/// Clang module map for the framework
pub fn render_modulemap(artifact: &ArtifactDescriptor) -> String {
    format!(
        "framework module {} {{\n    umbrella header \"{}.h\"\n\n    export *\n    module * {{ export * }}\n}}\n",
        artifact.base_name, artifact.base_name
    )
}

/// CocoaPods spec for distributing the Apple slices
///
/// The podspec sits at the root of the output directory and vendors the
/// device slice, falling back to the first simulator slice.
pub fn render_podspec(artifact: &ArtifactDescriptor) -> String {
    let vendored = artifact
        .vendored_slice()
        .map(|slice| slash_path(&slice.path))
        .unwrap_or_else(|| artifact.framework_name());

    let mut lines = vec![
        "Pod::Spec.new do |spec|".to_string(),
        format!(
            "    spec.name                     = '{}'",
            ruby_escape(&artifact.base_name)
        ),
        format!("    spec.version                  = '{}'", artifact.version),
        format!(
            "    spec.homepage                 = '{}'",
            ruby_escape(artifact.homepage.as_deref().unwrap_or_default())
        ),
        "    spec.source                   = { :http=> ''}".to_string(),
        "    spec.authors                  = ''".to_string(),
        "    spec.license                  = ''".to_string(),
        format!(
            "    spec.summary                  = '{}'",
            ruby_escape(artifact.summary.as_deref().unwrap_or_default())
        ),
        format!(
            "    spec.vendored_frameworks      = '{}'",
            ruby_escape(&vendored)
        ),
    ];
    if let Some(minimum_os) = artifact.minimum_os {
        lines.push(format!(
            "    spec.ios.deployment_target    = '{}'",
            minimum_os
        ));
    }
    if artifact.is_static() {
        lines.push("    spec.static_framework         = true".to_string());
    }
    lines.push("end".to_string());

    let mut podspec = lines.join("\n");
    podspec.push('\n');
    podspec
}

/// Library manifest for the Android slice
pub fn render_android_manifest(android: &AndroidLibrary) -> String {
    let mut manifest = format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
         <manifest xmlns:android=\"http://schemas.android.com/apk/res/android\"\n    \
         package=\"{}\">\n",
        xml_escape(&android.namespace)
    );
    match (android.min_sdk, android.compile_sdk) {
        (None, None) => {}
        (min, target) => {
            manifest.push_str("    <uses-sdk");
            if let Some(min) = min {
                manifest.push_str(&format!(" android:minSdkVersion=\"{}\"", min));
            }
            if let Some(target) = target {
                manifest.push_str(&format!(" android:targetSdkVersion=\"{}\"", target));
            }
            manifest.push_str(" />\n");
        }
    }
    manifest.push_str("</manifest>\n");
    manifest
}

/// Relative path with `/` separators, as podspecs expect
fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Entries of `dir`, empty when it does not exist
fn read_dir(dir: &Path) -> BuildResult<Vec<fs::DirEntry>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    fs::read_dir(dir)
        .and_then(|entries| entries.collect::<std::io::Result<Vec<_>>>())
        .map_err(|e| BuildError::io(dir, e))
}

fn remove_path(path: &Path) -> BuildResult<()> {
    let result = if path.is_dir() {
        fs::remove_dir_all(path)
    } else if path.exists() {
        fs::remove_file(path)
    } else {
        return Ok(());
    };
    result.map_err(|e| BuildError::io(path, e))
}

/// Escape a value for a single-quoted Ruby string
fn ruby_escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
