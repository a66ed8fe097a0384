//! Qualitative reading of a fitness score.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FitnessBand {
    Excellent,
    Good,
    Average,
    Poor,
}

impl FitnessBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 98.0 {
            FitnessBand::Excellent
        } else if score >= 90.0 {
            FitnessBand::Good
        } else if score >= 75.0 {
            FitnessBand::Average
        } else {
            FitnessBand::Poor
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            FitnessBand::Excellent => "Excellent schedule!",
            FitnessBand::Good => "Good schedule.",
            FitnessBand::Average => "Average schedule.",
            FitnessBand::Poor => "Poor schedule!",
        }
    }

    pub fn detail(&self) -> &'static str {
        match self {
            FitnessBand::Excellent => "Very high fitness, near-perfect constraint satisfaction.",
            FitnessBand::Good => "Minor issues may exist.",
            FitnessBand::Average => "Consider revising input.",
            FitnessBand::Poor => "Many conflicts detected.",
        }
    }

    /// Text colour class
    pub fn color_class(&self) -> &'static str {
        match self {
            FitnessBand::Excellent | FitnessBand::Good => "text-green-400",
            FitnessBand::Average => "text-yellow-400",
            FitnessBand::Poor => "text-red-400",
        }
    }
}
