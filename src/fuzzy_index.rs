use std::collections::HashMap;

/// A fuzzy n-gram index over a set of texts, supporting cosine-similarity retrieval.
///
/// For each gram size in `[gram_size_lower, gram_size_upper]` the index keeps an inverted map
/// from gram to the entries that contain it, plus the per-entry gram-count vector norm needed to
/// compute cosine similarity at query time.
#[derive(Debug, Clone)]
pub struct FuzzyIndex {
	gram_size_lower: usize,
	gram_size_upper: usize,
	/// lowercased value -> original-case value, used for dedup and to recover original casing.
	exact_set: HashMap<String, String>,
	tables: HashMap<usize, GramTable>,
}

#[derive(Debug, Clone, Default)]
struct GramTable {
	/// entry index -> (norm, lowercased text)
	entries: Vec<(f64, String)>,
	/// gram -> (entry_index, occurrences_in_entry)
	inverted: HashMap<String, Vec<(usize, u32)>>,
}

impl FuzzyIndex {
	pub fn new(gram_size_lower: usize, gram_size_upper: usize) -> Self {
		let mut tables = HashMap::new();
		for g in gram_size_lower..=gram_size_upper {
			tables.insert(g, GramTable::default());
		}
		Self {
			gram_size_lower,
			gram_size_upper,
			exact_set: HashMap::new(),
			tables,
		}
	}

	/// Inserts `value` into every gram-size table. No-op (returns `false`) if the lowercased
	/// value already exists.
	pub fn add(&mut self, value: &str) -> bool {
		let lvalue = value.to_lowercase();
		if self.exact_set.contains_key(&lvalue) {
			return false;
		}
		for g in self.gram_size_lower..=self.gram_size_upper {
			let table = self.tables.get_mut(&g).expect("gram table for every configured size");
			let idx = table.entries.len();
			let grams = gram_counts(&lvalue, g);
			let norm = (grams.values().map(|&c| (c * c) as f64).sum::<f64>()).sqrt();
			for (gram, occ) in &grams {
				table.inverted.entry(gram.clone()).or_default().push((idx, *occ));
			}
			table.entries.push((norm, lvalue.clone()));
		}
		self.exact_set.insert(lvalue, value.to_string());
		true
	}

	/// Returns `(score, original_case_text)` pairs for texts similar to `value`, at or above
	/// `min_score`. When `exact_only` is set, only an exact (case-insensitive) match is returned.
	pub fn query(&self, value: &str, min_score: f64, exact_only: bool) -> Vec<(f64, String)> {
		let lvalue = value.to_lowercase();
		if exact_only {
			if let Some(exact) = self.exact_set.get(&lvalue) {
				return vec![(1.0, exact.clone())];
			}
			return Vec::new();
		}

		for g in (self.gram_size_lower..=self.gram_size_upper).rev() {
			let results = self.query_at_gram_size(&lvalue, g, min_score);
			if !results.is_empty() {
				return results;
			}
		}
		Vec::new()
	}

	fn query_at_gram_size(&self, lvalue: &str, gram_size: usize, min_score: f64) -> Vec<(f64, String)> {
		let Some(table) = self.tables.get(&gram_size) else {
			return Vec::new();
		};

		let grams = gram_counts(lvalue, gram_size);
		let q_norm = (grams.values().map(|&c| (c * c) as f64).sum::<f64>()).sqrt();
		if q_norm == 0.0 {
			return Vec::new();
		}

		let mut dot: HashMap<usize, f64> = HashMap::new();
		for (gram, occ) in &grams {
			if let Some(postings) = table.inverted.get(gram) {
				for (idx, other_occ) in postings {
					*dot.entry(*idx).or_insert(0.0) += (*occ as f64) * (*other_occ as f64);
				}
			}
		}

		// Stable sort by score descending; ties keep insertion (entry-index) order.
		let mut scored: Vec<(f64, usize)> = dot
			.into_iter()
			.map(|(idx, d)| {
				let (entry_norm, _) = &table.entries[idx];
				let score = if *entry_norm == 0.0 { 0.0 } else { d / (q_norm * entry_norm) };
				(score, idx)
			})
			.filter(|(score, _)| *score >= min_score)
			.collect();
		scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal).then(a.1.cmp(&b.1)));

		scored
			.into_iter()
			.map(|(score, idx)| {
				let (_, lowercased) = &table.entries[idx];
				let original = self.exact_set.get(lowercased).cloned().unwrap_or_else(|| lowercased.clone());
				(score, original)
			})
			.collect()
	}
}

/// The gram-count multiset of `value` at `gram_size`, over the sentinel-padded string
/// `"-" + value + "-"`, right-padded with `-` until it is at least `gram_size` long.
fn gram_counts(value: &str, gram_size: usize) -> HashMap<String, u32> {
	let mut padded: Vec<char> = Vec::with_capacity(value.chars().count() + 2);
	padded.push('-');
	padded.extend(value.chars());
	padded.push('-');
	while padded.len() < gram_size {
		padded.push('-');
	}

	let mut counts: HashMap<String, u32> = HashMap::new();
	if gram_size == 0 || padded.len() < gram_size {
		return counts;
	}
	for window in padded.windows(gram_size) {
		let gram: String = window.iter().collect();
		*counts.entry(gram).or_insert(0) += 1;
	}
	counts
}
