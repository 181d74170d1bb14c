//! Source-side noise applied to training sentences.
//!
//! Configured as a list of single-key maps:
//!
//! ```yaml
//! src_noise:
//!   - dropout: 0.1
//!   - replacement: 0.1
//!   - permutation: 3
//! ```
use std::collections::BTreeMap;
use std::convert::TryFrom;

use rand::Rng;
use serde::Deserialize;

/// Token replacing words under [NoiseMethod::Replacement].
pub const BLANK_TOKEN: &str = "<blank>";

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>")]
pub enum NoiseMethod {
    /// Delete each token with the given probability, never emptying the sentence.
    Dropout(f64),
    /// Replace each token with [BLANK_TOKEN] with the given probability.
    Replacement(f64),
    /// Shuffle tokens locally, each token moving at most this many positions.
    Permutation(usize),
}

fn probability(name: &str, p: f64) -> Result<f64, String> {
    if (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(format!("{} probability must be in [0, 1], got {}", name, p))
    }
}

impl TryFrom<BTreeMap<String, f64>> for NoiseMethod {
    type Error = String;

    fn try_from(map: BTreeMap<String, f64>) -> Result<Self, Self::Error> {
        let mut entries = map.into_iter();
        let (name, arg) = match (entries.next(), entries.next()) {
            (Some(entry), None) => entry,
            _ => return Err("a noise method must be a single `name: value` entry".to_string()),
        };
        match name.to_lowercase().as_str() {
            "dropout" => Ok(NoiseMethod::Dropout(probability(&name, arg)?)),
            "replacement" => Ok(NoiseMethod::Replacement(probability(&name, arg)?)),
            "permutation" if arg >= 0.0 && arg.fract() == 0.0 => {
                Ok(NoiseMethod::Permutation(arg as usize))
            }
            "permutation" => Err(format!("invalid permutation distance {}", arg)),
            other => Err(format!("invalid noise type: {}", other)),
        }
    }
}

impl NoiseMethod {
    pub fn apply<R: Rng + ?Sized>(&self, tokens: Vec<String>, rng: &mut R) -> Vec<String> {
        match *self {
            NoiseMethod::Dropout(p) => {
                if tokens.is_empty() {
                    return tokens;
                }
                let keep: Vec<bool> = tokens.iter().map(|_| !rng.gen_bool(p)).collect();
                if keep.iter().any(|k| *k) {
                    tokens
                        .into_iter()
                        .zip(keep)
                        .filter_map(|(token, keep)| keep.then(|| token))
                        .collect()
                } else {
                    let i = rng.gen_range(0..tokens.len());
                    vec![tokens[i].clone()]
                }
            }
            NoiseMethod::Replacement(p) => tokens
                .into_iter()
                .map(|token| {
                    if rng.gen_bool(p) {
                        BLANK_TOKEN.to_string()
                    } else {
                        token
                    }
                })
                .collect(),
            NoiseMethod::Permutation(k) => {
                if k == 0 {
                    return tokens;
                }
                let mut keyed: Vec<(f64, String)> = tokens
                    .into_iter()
                    .enumerate()
                    .map(|(i, token)| (i as f64 + rng.gen_range(0.0..(k as f64 + 1.0)), token))
                    .collect();
                keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
                keyed.into_iter().map(|(_, token)| token).collect()
            }
        }
    }
}

/// Apply `methods` in sequence to the whitespace tokens of `sentence`.
pub fn apply_noise<R: Rng + ?Sized>(methods: &[NoiseMethod], sentence: &str, rng: &mut R) -> String {
    if methods.is_empty() {
        return sentence.to_string();
    }
    let mut tokens: Vec<String> = sentence.split_whitespace().map(String::from).collect();
    for method in methods {
        tokens = method.apply(tokens, rng);
    }
    tokens.join(" ")
}
