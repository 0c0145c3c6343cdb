//! The similarity index: a fitted TF-IDF vectorizer plus a term-weighted
//! matrix aligned row-for-row with the scheme catalog. Built offline by the
//! `policyseek-index` binary, loaded read-only at startup, never mutated.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// One government scheme, as stored in the offline catalog. Every field is
/// free text; anything absent in the source JSON defaults to empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SchemeRecord {
    #[serde(default)]
    pub scheme_name: String,
    #[serde(default, rename = "schemeCategory")]
    pub scheme_category: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub benefits: String,
    #[serde(default)]
    pub eligibility: String,
    #[serde(default)]
    pub application: String,
    #[serde(default)]
    pub documents: String,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub details: String,
}

impl SchemeRecord {
    /// The text the index is built over: all fields, space-joined. Tokenizing
    /// lowercases, so the stored corpus is effectively lower-cased.
    pub fn corpus_text(&self) -> String {
        [
            self.scheme_name.as_str(),
            self.scheme_category.as_str(),
            self.level.as_str(),
            self.benefits.as_str(),
            self.eligibility.as_str(),
            self.application.as_str(),
            self.documents.as_str(),
            self.tags.as_str(),
            self.details.as_str(),
        ]
        .join(" ")
    }
}

/// Lower-cased alphanumeric runs of at least two characters, the token
/// pattern the index was fitted with. Queries must go through the same
/// tokenizer or their terms never match the vocabulary.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 2)
        .map(|t| t.to_lowercase())
        .collect()
}

/// A fitted TF-IDF model: vocabulary term -> column index, plus per-column
/// inverse document frequency. `vocabulary.len() == idf.len()` always.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vectorizer {
    pub vocabulary: HashMap<String, usize>,
    pub idf: Vec<f64>,
}

impl Vectorizer {
    pub fn dimension(&self) -> usize {
        self.idf.len()
    }

    /// Fit over a corpus with smoothed idf: `ln((1+n)/(1+df)) + 1`.
    /// Vocabulary columns are assigned in sorted term order so fitting is
    /// deterministic across runs.
    pub fn fit(documents: &[String]) -> Self {
        let mut df: BTreeMap<String, usize> = BTreeMap::new();
        for doc in documents {
            let unique: BTreeSet<String> = tokenize(doc).into_iter().collect();
            for term in unique {
                *df.entry(term).or_default() += 1;
            }
        }

        let n = documents.len();
        let mut vocabulary = HashMap::with_capacity(df.len());
        let mut idf = Vec::with_capacity(df.len());
        for (column, (term, count)) in df.into_iter().enumerate() {
            vocabulary.insert(term, column);
            idf.push(((1 + n) as f64 / (1 + count) as f64).ln() + 1.0);
        }
        Self { vocabulary, idf }
    }

    /// Map text into the fitted vector space. Out-of-vocabulary terms
    /// contribute nothing; an all-OOV query yields the zero vector.
    pub fn transform(&self, text: &str) -> Vec<f64> {
        let mut vector = vec![0.0; self.idf.len()];
        for token in tokenize(text) {
            if let Some(&column) = self.vocabulary.get(token.as_str()) {
                vector[column] += self.idf[column];
            }
        }
        vector
    }
}

/// Serialized form of the matrix + catalog bundle artifact.
#[derive(Debug, Serialize, Deserialize)]
struct IndexArtifact {
    matrix: Vec<Vec<f64>>,
    schemes: Vec<SchemeRecord>,
}

/// Immutable pair of vectorizer and matrix, aligned with the scheme catalog.
/// Shared across requests behind an `Arc`; there is no reload path.
#[derive(Debug, Clone)]
pub struct SimilarityIndex {
    pub vectorizer: Vectorizer,
    pub matrix: Vec<Vec<f64>>,
    pub schemes: Vec<SchemeRecord>,
}

impl SimilarityIndex {
    /// Fit a vectorizer over the catalog and materialize one L2-normalized
    /// TF-IDF row per scheme.
    pub fn build(schemes: Vec<SchemeRecord>) -> Self {
        let documents: Vec<String> = schemes.iter().map(SchemeRecord::corpus_text).collect();
        let vectorizer = Vectorizer::fit(&documents);
        let matrix = documents
            .iter()
            .map(|doc| l2_normalize(vectorizer.transform(doc)))
            .collect();
        Self {
            vectorizer,
            matrix,
            schemes,
        }
    }

    /// Load both artifact files and validate their shape invariants:
    /// one matrix row per scheme, every row in the vectorizer's dimension.
    pub fn load(vectorizer_path: &Path, index_path: &Path) -> Result<Self, AppError> {
        let vectorizer: Vectorizer =
            serde_json::from_str(&fs::read_to_string(vectorizer_path)?)?;
        if vectorizer.vocabulary.len() != vectorizer.idf.len() {
            return Err(AppError::InvalidArtifact(format!(
                "vocabulary has {} terms but idf has {} entries",
                vectorizer.vocabulary.len(),
                vectorizer.idf.len()
            )));
        }
        if let Some((term, &column)) = vectorizer
            .vocabulary
            .iter()
            .find(|&(_, &column)| column >= vectorizer.dimension())
        {
            return Err(AppError::InvalidArtifact(format!(
                "term {term:?} maps to column {column}, outside dimension {}",
                vectorizer.dimension()
            )));
        }

        let artifact: IndexArtifact = serde_json::from_str(&fs::read_to_string(index_path)?)?;
        if artifact.matrix.len() != artifact.schemes.len() {
            return Err(AppError::InvalidArtifact(format!(
                "matrix has {} rows but catalog has {} schemes",
                artifact.matrix.len(),
                artifact.schemes.len()
            )));
        }
        if let Some(row) = artifact
            .matrix
            .iter()
            .find(|row| row.len() != vectorizer.dimension())
        {
            return Err(AppError::InvalidArtifact(format!(
                "matrix row has dimension {} but vectorizer has {}",
                row.len(),
                vectorizer.dimension()
            )));
        }

        Ok(Self {
            vectorizer,
            matrix: artifact.matrix,
            schemes: artifact.schemes,
        })
    }

    /// Write both artifact files, creating parent directories as needed.
    pub fn save(&self, vectorizer_path: &Path, index_path: &Path) -> Result<(), AppError> {
        for path in [vectorizer_path, index_path] {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(vectorizer_path, serde_json::to_string(&self.vectorizer)?)?;
        let artifact = IndexArtifact {
            matrix: self.matrix.clone(),
            schemes: self.schemes.clone(),
        };
        fs::write(index_path, serde_json::to_string(&artifact)?)?;
        Ok(())
    }
}

pub(crate) fn l2_normalize(mut vector: Vec<f64>) -> Vec<f64> {
    let norm = vector.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm > 0.0 {
        for v in &mut vector {
            *v /= norm;
        }
    }
    vector
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheme(name: &str, details: &str) -> SchemeRecord {
        SchemeRecord {
            scheme_name: name.to_string(),
            details: details.to_string(),
            ..SchemeRecord::default()
        }
    }

    #[test]
    fn tokenize_lowercases_and_drops_short_tokens() {
        assert_eq!(
            tokenize("Startup India: a 1-stop PORTAL!"),
            vec!["startup", "india", "stop", "portal"]
        );
    }

    #[test]
    fn fit_assigns_sorted_columns_and_matching_idf() {
        let docs = vec!["beta alpha".to_string(), "alpha gamma".to_string()];
        let v = Vectorizer::fit(&docs);
        assert_eq!(v.dimension(), 3);
        assert_eq!(v.vocabulary["alpha"], 0);
        assert_eq!(v.vocabulary["beta"], 1);
        assert_eq!(v.vocabulary["gamma"], 2);
        // "alpha" appears in both documents, so its idf is the smallest.
        assert!(v.idf[0] < v.idf[1]);
        assert_eq!(v.idf[1], v.idf[2]);
    }

    #[test]
    fn transform_of_all_oov_query_is_zero_vector() {
        let v = Vectorizer::fit(&["alpha beta".to_string()]);
        let q = v.transform("unrelated words entirely");
        assert!(q.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn build_aligns_matrix_with_catalog() {
        let index = SimilarityIndex::build(vec![
            scheme("A", "farming subsidy support"),
            scheme("B", "student scholarship grant"),
        ]);
        assert_eq!(index.matrix.len(), index.schemes.len());
        for row in &index.matrix {
            assert_eq!(row.len(), index.vectorizer.dimension());
            let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("system time before UNIX_EPOCH")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("policyseek-index-{nanos}"));
        let vec_path = dir.join("vectorizer.json");
        let idx_path = dir.join("index.json");

        let built = SimilarityIndex::build(vec![scheme("A", "solar power subsidy")]);
        built.save(&vec_path, &idx_path).expect("save");

        let loaded = SimilarityIndex::load(&vec_path, &idx_path).expect("load");
        assert_eq!(loaded.schemes, built.schemes);
        assert_eq!(loaded.matrix, built.matrix);
        assert_eq!(loaded.vectorizer.dimension(), built.vectorizer.dimension());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_rejects_misaligned_matrix() {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("system time before UNIX_EPOCH")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("policyseek-badindex-{nanos}"));
        std::fs::create_dir_all(&dir).expect("mkdir");
        let vec_path = dir.join("vectorizer.json");
        let idx_path = dir.join("index.json");

        let built = SimilarityIndex::build(vec![scheme("A", "alpha beta")]);
        std::fs::write(
            &vec_path,
            serde_json::to_string(&built.vectorizer).expect("json"),
        )
        .expect("write");
        // One matrix row, two schemes.
        std::fs::write(
            &idx_path,
            serde_json::to_string(&serde_json::json!({
                "matrix": built.matrix.clone(),
                "schemes": [built.schemes[0].clone(), built.schemes[0].clone()],
            }))
            .expect("json"),
        )
        .expect("write");

        let err = SimilarityIndex::load(&vec_path, &idx_path).expect_err("must fail");
        assert!(matches!(err, AppError::InvalidArtifact(_)));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
