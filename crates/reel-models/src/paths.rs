//! Directory layout shared by the pipeline stages.
//!
//! Every stage receives its paths from a [`ReelPaths`] value; nothing is
//! resolved against the process working directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// File name of the assembly manifest inside the clips directory.
pub const MANIFEST_FILE: &str = "concat_list.txt";
/// File name of the cue file inside the work root.
pub const CUE_FILE: &str = "subtitles.srt";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReelPaths {
    /// Downloaded source images (`scene_001.png`, ...)
    pub raw_images_dir: PathBuf,
    /// Letterboxed frames (`image1.jpg`, ...)
    pub frames_dir: PathBuf,
    /// Narration (`scene1.mp3`, ...)
    pub audio_dir: PathBuf,
    /// Per-scene clips and the manifest
    pub clips_dir: PathBuf,
    pub cue_file: PathBuf,
    pub output_video: PathBuf,
}

impl ReelPaths {
    /// Conventional layout under a single work root.
    pub fn under(root: impl AsRef<Path>, output_video: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            raw_images_dir: root.join("images"),
            frames_dir: root.join("images_processed"),
            audio_dir: root.join("audios"),
            clips_dir: root.join("clips"),
            cue_file: root.join(CUE_FILE),
            output_video: output_video.as_ref().to_path_buf(),
        }
    }

    pub fn frame_path(&self, scene_number: u32) -> PathBuf {
        self.frames_dir.join(frame_file_name(scene_number))
    }

    pub fn audio_path(&self, scene_number: u32) -> PathBuf {
        self.audio_dir.join(format!("scene{}.mp3", scene_number))
    }

    pub fn clip_path(&self, scene_number: u32) -> PathBuf {
        self.clips_dir.join(format!("temp_scene_{}.mp4", scene_number))
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.clips_dir.join(MANIFEST_FILE)
    }

    /// Stem for a downloaded image; zero-padded so lexicographic order is
    /// scene order.
    pub fn raw_image_stem(scene_number: u32) -> String {
        format!("scene_{:03}", scene_number)
    }

    /// Directories that must exist before the pipeline runs.
    pub fn directories(&self) -> [&Path; 4] {
        [
            &self.raw_images_dir,
            &self.frames_dir,
            &self.audio_dir,
            &self.clips_dir,
        ]
    }
}

/// Name of the preprocessed frame for a scene.
pub fn frame_file_name(scene_number: u32) -> String {
    format!("image{}.jpg", scene_number)
}
