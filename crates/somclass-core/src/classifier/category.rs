//! Output categories and classification results.

use serde::{Deserialize, Serialize};

/// Category assigned to a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextCategory {
    /// Model class 0.
    Prose,
    /// Model class 1.
    Poetry,
    /// Too little content survived normalization to run the model.
    #[serde(rename = "INSUFFICIENT_INPUT")]
    InsufficientInput,
}

impl TextCategory {
    /// Returns the categories the model can predict, in class-index order.
    pub fn model_classes() -> &'static [TextCategory] {
        &[TextCategory::Prose, TextCategory::Poetry]
    }

    /// Maps a model output index to a category.
    pub fn from_index(index: usize) -> Option<TextCategory> {
        Self::model_classes().get(index).copied()
    }

    /// Returns the label reported to callers.
    pub fn label(&self) -> &'static str {
        match self {
            TextCategory::Prose => "Prose",
            TextCategory::Poetry => "Poetry",
            TextCategory::InsufficientInput => "INSUFFICIENT_INPUT",
        }
    }
}

/// Softmax output of the two-class model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassProbabilities {
    probabilities: [f32; 2],
}

impl ClassProbabilities {
    /// Wraps a probability pair (index 0 = prose, index 1 = poetry).
    pub fn new(prose: f32, poetry: f32) -> Self {
        Self {
            probabilities: [prose.clamp(0.0, 1.0), poetry.clamp(0.0, 1.0)],
        }
    }

    /// Builds probabilities from raw logits using softmax.
    pub fn from_logits(prose: f32, poetry: f32) -> Self {
        let (a, b) = softmax(prose, poetry);
        Self::new(a, b)
    }

    /// Returns the probabilities in class-index order.
    pub fn as_slice(&self) -> &[f32] {
        &self.probabilities
    }

    /// Returns the winning class index and its probability.
    ///
    /// Ties resolve to the lower index.
    pub fn best(&self) -> (usize, f32) {
        let [p0, p1] = self.probabilities;
        if p1 > p0 {
            (1, p1)
        } else {
            (0, p0)
        }
    }
}

/// Computes softmax for two values.
fn softmax(a: f32, b: f32) -> (f32, f32) {
    let max = a.max(b);
    let exp_a = (a - max).exp();
    let exp_b = (b - max).exp();
    let sum = exp_a + exp_b;
    (exp_a / sum, exp_b / sum)
}

/// Result of classifying one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Model identifier.
    pub model: String,
    /// Predicted category.
    #[serde(rename = "type")]
    pub category: TextCategory,
    /// Probability of the predicted class (0.0 to 1.0).
    pub confidence: f32,
    /// Wall-clock time from pipeline entry, in seconds.
    pub processing_time: f64,
    /// Static accuracy descriptor of the model.
    pub accuracy: String,
    /// Formatted processing time.
    pub speed: String,
}
