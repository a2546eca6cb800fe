//! Final concatenation of scene clips.

use std::path::{Path, PathBuf};

use reel_models::ReelPaths;
use tracing::{error, info};

use crate::error::{MediaError, MediaResult};
use crate::fs_utils::{absolute_path, remove_files};
use crate::pipeline::MediaPipeline;
use crate::renderer::RenderedClip;

/// Writes the concat manifest and joins clips into the output video.
#[derive(Debug, Clone)]
pub struct SequenceAssembler {
    paths: ReelPaths,
}

impl SequenceAssembler {
    pub fn new(paths: ReelPaths) -> Self {
        Self { paths }
    }

    /// Concat-demuxer manifest for `clips`, in ascending scene order.
    pub fn manifest_contents(clips: &[RenderedClip]) -> MediaResult<String> {
        let mut ordered: Vec<&RenderedClip> = clips.iter().collect();
        ordered.sort_by_key(|c| c.scene_number);

        let mut out = String::new();
        for clip in ordered {
            let path = absolute_path(&clip.path)?;
            let path = path.to_str().ok_or_else(|| MediaError::NonUtf8Path(path.clone()))?;
            out.push_str(&format!("file '{}'\n", path.replace('\'', "'\\''")));
        }
        Ok(out)
    }

    /// Write the manifest, concatenate, and clean up.
    ///
    /// On success every clip and the manifest are deleted. On failure they
    /// are left in place and the returned error carries the engine's stderr.
    pub async fn assemble<P>(&self, pipeline: &P, clips: &[RenderedClip]) -> MediaResult<PathBuf>
    where
        P: MediaPipeline + ?Sized,
    {
        if clips.is_empty() {
            return Err(MediaError::EmptyManifest);
        }

        let manifest = self.paths.manifest_path();
        self.write_manifest(&manifest, clips).await?;

        let output = &self.paths.output_video;
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        if let Err(e) = pipeline.concat(&manifest, output).await {
            error!(
                error = %e,
                stderr = e.stderr().unwrap_or(""),
                "Concatenation failed, keeping clips in {}",
                self.paths.clips_dir.display()
            );
            return Err(e);
        }

        let removed = remove_files(clips.iter().map(|c| c.path.as_path())).await
            + remove_files([manifest.as_path()]).await;
        info!(
            clips = clips.len(),
            removed,
            "Final video written to {}",
            output.display()
        );
        Ok(output.clone())
    }

    async fn write_manifest(&self, manifest: &Path, clips: &[RenderedClip]) -> MediaResult<()> {
        if let Some(parent) = manifest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(manifest, Self::manifest_contents(clips)?).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(n: u32, path: &str) -> RenderedClip {
        RenderedClip {
            scene_number: n,
            path: PathBuf::from(path),
            duration: 1.0,
        }
    }

    #[test]
    fn test_manifest_sorted_by_scene() {
        let contents = SequenceAssembler::manifest_contents(&[
            clip(3, "/w/clips/temp_scene_3.mp4"),
            clip(1, "/w/clips/temp_scene_1.mp4"),
        ])
        .unwrap();
        assert_eq!(
            contents,
            "file '/w/clips/temp_scene_1.mp4'\nfile '/w/clips/temp_scene_3.mp4'\n"
        );
    }

    #[test]
    fn test_manifest_escapes_quotes() {
        let contents =
            SequenceAssembler::manifest_contents(&[clip(1, "/w/it's/temp_scene_1.mp4")]).unwrap();
        assert_eq!(contents, "file '/w/it'\\''s/temp_scene_1.mp4'\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_manifest_rejects_non_utf8_path() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let clip = RenderedClip {
            scene_number: 1,
            path: PathBuf::from(OsStr::from_bytes(b"/w/clips/temp_\xff.mp4")),
            duration: 1.0,
        };
        let result = SequenceAssembler::manifest_contents(&[clip]);
        assert!(matches!(result, Err(MediaError::NonUtf8Path(_))));
    }

    #[test]
    fn test_manifest_paths_are_absolute() {
        let contents =
            SequenceAssembler::manifest_contents(&[clip(1, "clips/temp_scene_1.mp4")]).unwrap();
        let path = contents.trim_end().trim_start_matches("file '").trim_end_matches('\'');
        assert!(Path::new(path).is_absolute());
    }
}
