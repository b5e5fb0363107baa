use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    error::AppResult,
    models::Movie,
    services::{
        model::Model,
        similarity::{FieldVectorizers, SimilarityMatrix},
        vectorizer::TfIdfVectorizer,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    Movies,
    Similarity,
    OverviewVectorizer,
    GenresVectorizer,
    CastVectorizer,
}

impl Artifact {
    pub fn file_name(&self) -> &'static str {
        match self {
            Artifact::Movies => "movies.bin",
            Artifact::Similarity => "similarity.bin",
            Artifact::OverviewVectorizer => "tfidf_overview.bin",
            Artifact::GenresVectorizer => "tfidf_genres.bin",
            Artifact::CastVectorizer => "tfidf_cast.bin",
        }
    }
}

const MANIFEST_FILE: &str = "manifest.json";

/// Build metadata written next to the artifacts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Manifest {
    pub built_at: DateTime<Utc>,
    pub movies: usize,
}

/// Saves and loads a [`Model`] as one unit in a directory
#[derive(Debug, Clone)]
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let name = self
            .dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "model".to_string());
        self.dir.with_file_name(format!(".{}.{}", name, suffix))
    }

    /// Writes every artifact into a staging directory, then swaps it in.
    ///
    /// The previous model stays in place until the new one is complete.
    pub fn save(&self, model: &Model) -> AppResult<()> {
        self.save_with(model, write_model)
    }

    fn save_with<F>(&self, model: &Model, write: F) -> AppResult<()>
    where
        F: FnOnce(&Path, &Model) -> AppResult<()>,
    {
        let staging = self.sibling(&format!("staging-{}", uuid::Uuid::new_v4()));
        if let Some(parent) = staging.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::create_dir_all(&staging)?;

        let result = write(&staging, model).and_then(|()| self.swap_in(&staging));
        if let Err(e) = result {
            tracing::error!(error = %e, staging = %staging.display(), "Model save failed");
            if let Err(cleanup) = fs::remove_dir_all(&staging) {
                tracing::warn!(error = %cleanup, staging = %staging.display(), "Staging directory left behind");
            }
            return Err(e);
        }

        tracing::info!(dir = %self.dir.display(), movies = model.len(), "Model saved");
        Ok(())
    }

    /// Replaces the live directory with `staging`, restoring the old one on failure
    fn swap_in(&self, staging: &Path) -> AppResult<()> {
        let retired = self.sibling("previous");
        if retired.exists() {
            fs::remove_dir_all(&retired)?;
        }
        let had_previous = self.dir.exists();
        if had_previous {
            fs::rename(&self.dir, &retired)?;
        }
        if let Err(e) = fs::rename(staging, &self.dir) {
            if had_previous {
                let _ = fs::rename(&retired, &self.dir);
            }
            return Err(e.into());
        }
        // The new model is live from here on
        if had_previous {
            if let Err(e) = fs::remove_dir_all(&retired) {
                tracing::warn!(error = %e, retired = %retired.display(), "Could not remove previous model");
            }
        }
        Ok(())
    }

    /// Reads every artifact and reassembles the model, checking alignment
    pub fn load(&self) -> AppResult<Model> {
        let movies: Vec<Movie> = read_artifact(&self.dir, Artifact::Movies)?;
        let similarity: SimilarityMatrix = read_artifact(&self.dir, Artifact::Similarity)?;
        let vectorizers = FieldVectorizers {
            overview: read_artifact::<TfIdfVectorizer>(&self.dir, Artifact::OverviewVectorizer)?,
            genres: read_artifact::<TfIdfVectorizer>(&self.dir, Artifact::GenresVectorizer)?,
            cast: read_artifact::<TfIdfVectorizer>(&self.dir, Artifact::CastVectorizer)?,
        };

        let model = Model::from_parts(movies, similarity, vectorizers)?;
        tracing::info!(dir = %self.dir.display(), movies = model.len(), "Model loaded");
        Ok(model)
    }

    /// Reads the build manifest
    pub fn manifest(&self) -> AppResult<Manifest> {
        let file = File::open(self.dir.join(MANIFEST_FILE))?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

fn write_model(dir: &Path, model: &Model) -> AppResult<()> {
    let vectorizers = model.vectorizers();
    write_artifact(dir, Artifact::Movies, &model.movies())?;
    write_artifact(dir, Artifact::Similarity, model.similarity())?;
    write_artifact(dir, Artifact::OverviewVectorizer, &vectorizers.overview)?;
    write_artifact(dir, Artifact::GenresVectorizer, &vectorizers.genres)?;
    write_artifact(dir, Artifact::CastVectorizer, &vectorizers.cast)?;

    let manifest = Manifest {
        built_at: Utc::now(),
        movies: model.len(),
    };
    let mut writer = BufWriter::new(File::create(dir.join(MANIFEST_FILE))?);
    serde_json::to_writer_pretty(&mut writer, &manifest)?;
    writer.flush()?;
    Ok(())
}

pub(crate) fn write_artifact<T: Serialize + ?Sized>(
    dir: &Path,
    artifact: Artifact,
    value: &T,
) -> AppResult<()> {
    let path = dir.join(artifact.file_name());
    let mut writer = BufWriter::new(File::create(&path)?);
    bincode::serialize_into(&mut writer, value)?;
    writer.flush()?;
    tracing::debug!(path = %path.display(), "Artifact written");
    Ok(())
}

fn read_artifact<T: DeserializeOwned>(dir: &Path, artifact: Artifact) -> AppResult<T> {
    let path = dir.join(artifact.file_name());
    let file = File::open(&path).map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "Missing model artifact");
        e
    })?;
    Ok(bincode::deserialize_from(BufReader::new(file))?)
}
