//! Fixed content requests: what to ask for each category and what to show with it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// The kind of learning content to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Explanation,
    Practice,
    Applications,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::Explanation,
        Category::Practice,
        Category::Applications,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Explanation => "explanation",
            Category::Practice => "practice",
            Category::Applications => "applications",
        }
    }

    /// Instruction text sent to the model.
    pub fn prompt(&self) -> &'static str {
        match self {
            Category::Explanation => {
                "Create an easy-to-understand explanation of quadratic equations for high school \
                 students in India. Define quadratic equations, explain how to solve them \
                 (factoring, completing the square, quadratic formula), discuss the discriminant's \
                 role, describe the graph of the equation, and give step-by-step examples. Use \
                 questions that start with 'why'. Aim for a reading level of grades 9-10 and \
                 sentences with 15-20 words."
            }
            Category::Practice => {
                "Create 10 practice problems with quadratic equations for high school students in \
                 India. For each problem, clearly state the question, provide a step-by-step \
                 solution, and include common mistakes and how to avoid them. Mix different solving \
                 methods and real-world applications. Use easy memory tricks. Ensure problems get \
                 harder gradually. Aim for easy-to-read text with a Flesch Reading Ease score above 60."
            }
            Category::Applications => {
                "Describe 5 real-world uses of quadratic equations for high school students in \
                 India. For each use, explain the situation and how it connects to quadratic \
                 equations, give a sample problem, show how to solve it, and explain why \
                 understanding quadratic equations is important. Use diverse and culturally relevant \
                 examples. Include a self-test question and summarization. Use simple words for \
                 better readability."
            }
        }
    }

    /// Illustrative parabola shown next to the generated content.
    pub fn quadratic(&self) -> QuadraticSpec {
        match self {
            // y = x² - 4
            Category::Explanation => QuadraticSpec::new(1.0, 0.0, -4.0),
            // y = 2x² - 4x - 2
            Category::Practice => QuadraticSpec::new(2.0, -4.0, -2.0),
            // projectile height over time, g = 9.8 m/s²
            Category::Applications => QuadraticSpec::new(-4.9, 20.0, 0.0),
        }
    }

    /// Heading shown above the chart.
    pub fn chart_heading(&self) -> &'static str {
        match self {
            Category::Explanation => "Example Graph of a U-shaped Equation:",
            Category::Practice => "Example Graph of a Math Problem:",
            Category::Applications => "Example Graph of a Real-World Use:",
        }
    }

    /// Chart title replacing the generic coefficient title, if any.
    pub fn chart_title(&self) -> Option<&'static str> {
        match self {
            Category::Applications => Some("Projectile Motion: Height vs Time"),
            _ => None,
        }
    }

    /// Fixed line shown after the extraction results.
    pub fn follow_up(&self) -> Option<&'static str> {
        match self {
            Category::Explanation => None,
            Category::Practice => {
                Some("Mixed Practice: Different solving methods and applications used")
            }
            Category::Applications => {
                Some("Quiz: Can you find the quadratic equation in each example?")
            }
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "explanation" => Ok(Category::Explanation),
            "practice" => Ok(Category::Practice),
            "applications" => Ok(Category::Applications),
            other => Err(Error::invalid_input(format!(
                "unknown category '{other}'. Valid values are: explanation, practice, applications"
            ))),
        }
    }
}

/// Coefficients of y = a·x² + b·x + c.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuadraticSpec {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl QuadraticSpec {
    pub const fn new(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c }
    }
}
