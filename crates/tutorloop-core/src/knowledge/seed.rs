//! Seed corpus loaded into an empty knowledge base

use super::SOURCE_SEED;
use crate::db::NewRecord;

pub struct SeedEntry {
    pub question: &'static str,
    pub answer: &'static str,
    pub category: &'static str,
    pub difficulty: &'static str,
    pub tags: &'static [&'static str],
}

pub const SEED_CORPUS: &[SeedEntry] = &[
    // general
    SeedEntry {
        question: "What is the Pythagorean theorem?",
        answer: "The Pythagorean theorem states that in a right-angled triangle, the square of the hypotenuse is equal to the sum of the squares of the other two sides. Formula: a² + b² = c²",
        category: "geometry",
        difficulty: "medium",
        tags: &[],
    },
    SeedEntry {
        question: "How to solve a quadratic equation?",
        answer: "A quadratic equation is solved using the quadratic formula: x = [-b ± √(b² - 4ac)] / (2a). Steps: 1. Identify coefficients a, b, c. 2. Calculate discriminant D = b² - 4ac. 3. Apply formula if D ≥ 0.",
        category: "algebra",
        difficulty: "medium",
        tags: &[],
    },
    SeedEntry {
        question: "What is the derivative of sin(x)?",
        answer: "The derivative of sin(x) with respect to x is cos(x). This is a fundamental rule in differential calculus.",
        category: "calculus",
        difficulty: "medium",
        tags: &[],
    },
    SeedEntry {
        question: "Explain the concept of limits in calculus.",
        answer: "A limit describes the value that a function approaches as the input approaches some value. Limits are essential to defining derivatives and integrals.",
        category: "calculus",
        difficulty: "medium",
        tags: &[],
    },
    SeedEntry {
        question: "What is the formula for the area of a circle?",
        answer: "The area of a circle is given by the formula A = πr², where 'r' is the radius of the circle and 'π' is approximately 3.14159.",
        category: "geometry",
        difficulty: "medium",
        tags: &[],
    },
    // JEE Advanced
    SeedEntry {
        question: "If the roots of the equation x² - bx + c = 0 are two consecutive integers, then b² - 4c equals?",
        answer: "Let the roots be n and n+1. Then sum of roots = n + (n+1) = 2n+1 = b. Product of roots = n(n+1) = c. Then b² - 4c = (2n+1)² - 4n(n+1) = 4n² + 4n + 1 - 4n² - 4n = 1. Therefore, b² - 4c = 1.",
        category: "jee_advanced",
        difficulty: "hard",
        tags: &["quadratic equations", "roots", "consecutive integers"],
    },
    SeedEntry {
        question: "The number of real solutions of the equation sin(e^x) = 5^x + 5^{-x} is?",
        answer: "Note that 5^x + 5^{-x} ≥ 2 for all real x (by AM-GM inequality). Since sin(e^x) ≤ 1 for all real x, the equation can only hold if the right side is at most 1, which never happens. Therefore, there are no real solutions. Answer: 0",
        category: "jee_advanced",
        difficulty: "hard",
        tags: &["exponential equations", "trigonometry", "inequalities"],
    },
    // IMO
    SeedEntry {
        question: "Find all functions f: R → R such that f(x + y) = f(x) + f(y) + 2xy for all real numbers x, y",
        answer: "Let g(x) = f(x) - x². Then g(x + y) = f(x + y) - (x + y)² = f(x) + f(y) + 2xy - x² - 2xy - y² = g(x) + g(y), so g satisfies Cauchy's equation. Over the continuous (or monotone, or bounded-on-an-interval) solutions g(x) = cx, giving f(x) = x² + cx for a real constant c. Verification: (x+y)² + c(x+y) = x² + cx + y² + cy + 2xy. Answer: f(x) = x² + cx",
        category: "imo",
        difficulty: "expert",
        tags: &["functional equations", "polynomials", "imo"],
    },
    // advanced calculus
    SeedEntry {
        question: "Evaluate the limit: lim(x→0) (sin(x) - x) / x³",
        answer: "Use L'Hôpital's rule repeatedly. lim(x→0) (sin(x) - x) / x³ = lim(x→0) (cos(x) - 1) / 3x² = lim(x→0) (-sin(x)) / 6x = lim(x→0) (-cos(x)) / 6 = -1/6. Alternatively, use Taylor series: sin(x) = x - x³/6 + x⁵/120 - ... So (sin(x)-x)/x³ = -1/6 + x²/120 - ... → -1/6 as x→0. Answer: -1/6",
        category: "calculus",
        difficulty: "advanced",
        tags: &["limits", "l'hopital's rule", "taylor series"],
    },
];

/// Seed corpus as insertable records
pub fn seed_records() -> Vec<NewRecord> {
    SEED_CORPUS
        .iter()
        .map(|entry| {
            NewRecord::new(entry.question, entry.answer, SOURCE_SEED)
                .with_category(entry.category)
                .with_difficulty(entry.difficulty)
                .with_tags(entry.tags.iter().copied())
        })
        .collect()
}
