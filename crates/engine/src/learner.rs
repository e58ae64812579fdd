//! Cross-project learner (spec §4.5.6): samples files in a language across a
//! project tree, aggregates per-pattern insights, proposes improvements, and
//! validates them before registering anything with the catalog.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use codelens_core::{EngineConfig, Pattern, PatternContext};
use codelens_parse::ParserDispatch;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::catalog::PatternCatalog;
use crate::compile::RegexCache;
use crate::matching::MatchRunner;

/// Per-pattern observations aggregated across the sampled files.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct PatternInsights {
    /// Keyed by capture name; the learner's proxy for "node type" since
    /// captures are the only labeled unit the matching layer exposes.
    pub node_type_frequencies: HashMap<String, u64>,
    pub capture_frequencies: HashMap<String, u64>,
    pub structure_frequencies: HashMap<String, u64>,
    /// predicate name -> (successes, total)
    pub predicates_success: HashMap<String, (u64, u64)>,
    pub baseline_match_count: u64,
}

impl PatternInsights {
    fn merge(&mut self, other: PatternInsights) {
        for (k, v) in other.node_type_frequencies {
            *self.node_type_frequencies.entry(k).or_default() += v;
        }
        for (k, v) in other.capture_frequencies {
            *self.capture_frequencies.entry(k).or_default() += v;
        }
        for (k, v) in other.structure_frequencies {
            *self.structure_frequencies.entry(k).or_default() += v;
        }
        for (k, (succ, total)) in other.predicates_success {
            let entry = self.predicates_success.entry(k).or_insert((0, 0));
            entry.0 += succ;
            entry.1 += total;
        }
        self.baseline_match_count += other.baseline_match_count;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedInsights {
    language_id: String,
    pattern_name: String,
    sampled_file_count: usize,
    insights: PatternInsights,
}

#[derive(Debug)]
pub struct ImprovedPattern {
    pub pattern_name: String,
    pub new_confidence: f32,
}

#[derive(Debug, Default)]
pub struct LearnerReport {
    pub sampled_files: usize,
    pub improved: Vec<ImprovedPattern>,
    pub rejected: Vec<String>,
}

/// Walks `project_root` collecting up to `config.learner_sample_size` files,
/// gitignore-aware, skipping anything over `config.learner_max_file_bytes`.
fn sample_files(project_root: &Path, config: &EngineConfig) -> Vec<PathBuf> {
    let mut out = Vec::new();
    let walker = ignore::WalkBuilder::new(project_root).build();
    for entry in walker.flatten() {
        if out.len() >= config.learner_sample_size {
            break;
        }
        let Some(file_type) = entry.file_type() else { continue };
        if !file_type.is_file() {
            continue;
        }
        let Ok(metadata) = entry.metadata() else { continue };
        if metadata.len() > config.learner_max_file_bytes {
            continue;
        }
        out.push(entry.into_path());
    }
    out
}

fn collect_insights_for_file(
    runner: &MatchRunner,
    pattern: &Pattern,
    language_id: &str,
    path: &Path,
    bytes: &[u8],
    dispatch: &ParserDispatch,
) -> Option<PatternInsights> {
    let source = String::from_utf8_lossy(bytes).into_owned();
    let classification = codelens_core::FileClassification {
        path: path.display().to_string(),
        language_id: language_id.to_string(),
        file_type: codelens_core::FileType::Code,
        parser_kind: if dispatch.has_grammar(language_id) {
            codelens_core::ParserKind::Grammar
        } else {
            codelens_core::ParserKind::Handwritten
        },
        fallback_parser_kind: None,
        confidence: 1.0,
        is_binary: false,
    };
    let parser = dispatch.get_parser(&classification).ok()?;
    let parsed = parser.parse(bytes);

    let context = PatternContext {
        parser_kind: parsed.tree.parser_kind(),
        ..PatternContext::new(language_id, path.display().to_string())
    };
    let metrics = codelens_core::PatternPerformanceMetrics::new();
    let recovery = codelens_core::RecoveryMetrics::default();
    let matches = runner.matches(&source, pattern, &parsed.tree, &context, &metrics, &recovery);

    let mut insights = PatternInsights {
        baseline_match_count: matches.len() as u64,
        ..Default::default()
    };
    for m in &matches {
        for (capture_name, captures) in &m.captures {
            *insights.capture_frequencies.entry(capture_name.clone()).or_default() += captures.len() as u64;
            *insights.node_type_frequencies.entry(capture_name.clone()).or_default() += captures.len() as u64;
            let structure_key = format!("{capture_name}:{capture_name}");
            *insights.structure_frequencies.entry(structure_key).or_default() += captures.len() as u64;
        }
        for predicate in &m.predicate_results {
            let entry = insights.predicates_success.entry(predicate.name.clone()).or_insert((0, 0));
            entry.1 += 1;
            if predicate.succeeded {
                entry.0 += 1;
            }
        }
    }
    Some(insights)
}

/// Runs one candidate pattern over `source` and returns its match count;
/// used both for test-case validation and for the accept/reject comparison
/// against the sampled-file baseline.
fn match_count(runner: &MatchRunner, pattern: &Pattern, language_id: &str, source: &str, dispatch: &ParserDispatch) -> usize {
    let classification = codelens_core::FileClassification {
        path: "test_case".to_string(),
        language_id: language_id.to_string(),
        file_type: codelens_core::FileType::Code,
        parser_kind: if dispatch.has_grammar(language_id) {
            codelens_core::ParserKind::Grammar
        } else {
            codelens_core::ParserKind::Handwritten
        },
        fallback_parser_kind: None,
        confidence: 1.0,
        is_binary: false,
    };
    let Ok(parser) = dispatch.get_parser(&classification) else {
        return 0;
    };
    let parsed = parser.parse(source.as_bytes());
    let context = PatternContext {
        parser_kind: parsed.tree.parser_kind(),
        ..PatternContext::new(language_id, "test_case")
    };
    let metrics = codelens_core::PatternPerformanceMetrics::new();
    let recovery = codelens_core::RecoveryMetrics::default();
    runner.matches(source, pattern, &parsed.tree, &context, &metrics, &recovery).len()
}

/// Applies the four improvement strategies in order, returning the first
/// one that proposes a change (spec §4.5.6 step 3).
fn propose_improvement(pattern: &Pattern, insights: &PatternInsights) -> Option<(Pattern, f32)> {
    node_pattern_improvement(pattern, insights)
        .or_else(|| capture_optimization(pattern, insights))
        .or_else(|| predicate_refinement(pattern, insights))
        .or_else(|| pattern_generalization(pattern, insights))
}

fn node_pattern_improvement(pattern: &Pattern, insights: &PatternInsights) -> Option<(Pattern, f32)> {
    let query = pattern.query.as_ref()?;
    if !query.contains("(_)") {
        return None;
    }
    let dominant = insights.node_type_frequencies.iter().max_by_key(|(_, count)| **count)?;
    if *dominant.1 == 0 {
        return None;
    }
    let mut improved = pattern.clone();
    improved.query = Some(query.replacen("(_)", &format!("({})", dominant.0), 1));
    Some((improved, pattern.confidence))
}

fn capture_optimization(pattern: &Pattern, insights: &PatternInsights) -> Option<(Pattern, f32)> {
    let query = pattern.query.as_ref()?;
    let dead: Vec<&String> = insights
        .capture_frequencies
        .iter()
        .filter(|(_, count)| **count == 0)
        .map(|(name, _)| name)
        .collect();
    if dead.is_empty() {
        return None;
    }
    let mut rewritten = query.clone();
    for name in dead {
        rewritten = rewritten.replace(&format!(" @{name}"), "");
    }
    if rewritten == *query {
        return None;
    }
    let mut improved = pattern.clone();
    improved.query = Some(rewritten);
    Some((improved, pattern.confidence))
}

fn predicate_refinement(pattern: &Pattern, insights: &PatternInsights) -> Option<(Pattern, f32)> {
    if insights.predicates_success.is_empty() {
        return None;
    }
    let (total_success, total): (u64, u64) = insights
        .predicates_success
        .values()
        .fold((0, 0), |(s, t), (succ, tot)| (s + succ, t + tot));
    if total == 0 {
        return None;
    }
    let ratio = total_success as f64 / total as f64;
    if ratio >= 0.95 {
        let boosted = (pattern.confidence + 0.02).min(1.0);
        return Some((pattern.clone(), boosted));
    }
    if ratio <= 0.05 {
        let penalized = (pattern.confidence - 0.1).max(0.0);
        return Some((pattern.clone(), penalized));
    }
    None
}

fn pattern_generalization(pattern: &Pattern, insights: &PatternInsights) -> Option<(Pattern, f32)> {
    let query = pattern.query.as_ref()?;
    let dominant_siblings: Vec<&String> = insights
        .structure_frequencies
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(key, _)| key)
        .collect();
    if dominant_siblings.len() < 2 {
        return None;
    }
    let kinds: Vec<String> = dominant_siblings
        .iter()
        .filter_map(|key| key.split(':').next_back().map(str::to_string))
        .collect();
    let union = format!("[{}]", kinds.iter().map(|k| format!("({k})")).collect::<Vec<_>>().join(" "));
    let mut improved = pattern.clone();
    // Generalizes the first parenthesized kind token, a conservative,
    // single-site rewrite consistent with the other strategies here.
    if let Some(start) = query.find('(') {
        if let Some(end) = query[start..].find(')') {
            let mut rewritten = query.clone();
            rewritten.replace_range(start..start + end + 1, &union);
            improved.query = Some(rewritten);
            return Some((improved, pattern.confidence));
        }
    }
    None
}

fn validate_against_test_cases(runner: &MatchRunner, candidate: &Pattern, language_id: &str, dispatch: &ParserDispatch) -> bool {
    for test_case in &candidate.metadata.test_cases {
        let count = match_count(runner, candidate, language_id, &test_case.source, dispatch);
        if count < test_case.expected_match_count {
            return false;
        }
    }
    true
}

fn persist_insights(dir: &Path, language_id: &str, entries: &[PersistedInsights]) -> io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let final_path = dir.join(format!("{language_id}.json"));
    let tmp_path = dir.join(format!("{language_id}.json.tmp"));
    let json = serde_json::to_vec_pretty(entries)?;
    std::fs::write(&tmp_path, json)?;
    std::fs::rename(&tmp_path, &final_path)?;
    Ok(())
}

/// Runs the full cross-project learner workflow for one language against
/// one project tree, registering validated improvements with `catalog`.
pub fn learn(
    language_id: &str,
    project_root: &Path,
    catalog: &PatternCatalog,
    dispatch: &ParserDispatch,
    regex_cache: &RegexCache,
    config: &EngineConfig,
) -> LearnerReport {
    let files = sample_files(project_root, config);
    let patterns = catalog.patterns_for_language(language_id);
    let runner = MatchRunner::new(dispatch, regex_cache, catalog, config.default_match_limit, config.default_timeout_micros);

    let mut report = LearnerReport {
        sampled_files: files.len(),
        ..Default::default()
    };

    let file_contents: Vec<(PathBuf, Vec<u8>)> = files
        .into_iter()
        .filter_map(|path| std::fs::read(&path).ok().map(|bytes| (path, bytes)))
        .collect();

    let mut persisted = Vec::new();

    for pattern in &patterns {
        let aggregated = file_contents
            .par_iter()
            .filter_map(|(path, bytes)| collect_insights_for_file(&runner, pattern, language_id, path, bytes, dispatch))
            .reduce(PatternInsights::default, |mut acc, next| {
                acc.merge(next);
                acc
            });

        persisted.push(PersistedInsights {
            language_id: language_id.to_string(),
            pattern_name: pattern.name.clone(),
            sampled_file_count: file_contents.len(),
            insights: aggregated.clone(),
        });

        let Some((candidate, new_confidence)) = propose_improvement(pattern, &aggregated) else {
            continue;
        };

        let query_compiles = match &candidate.query {
            Some(query) => dispatch
                .grammar_parser(language_id)
                .and_then(|p| p.as_any().downcast_ref::<codelens_parse::backends::GrammarParser>().map(|g| g.validate_query(query)))
                .unwrap_or(false),
            None => true,
        };
        let regex_compiles = candidate.regex.as_ref().map_or(true, |r| regex::Regex::new(r).is_ok());
        if !query_compiles || !regex_compiles {
            report.rejected.push(pattern.name.clone());
            continue;
        }

        let new_match_total: usize = file_contents
            .par_iter()
            .map(|(path, bytes)| {
                let source = String::from_utf8_lossy(bytes);
                let _ = path;
                match_count(&runner, &candidate, language_id, &source, dispatch)
            })
            .sum();

        if (new_match_total as u64) < aggregated.baseline_match_count {
            report.rejected.push(pattern.name.clone());
            continue;
        }
        if !validate_against_test_cases(&runner, &candidate, language_id, dispatch) {
            report.rejected.push(pattern.name.clone());
            continue;
        }

        let mut accepted = candidate;
        accepted.confidence = new_confidence;
        catalog.register_improved(language_id, &pattern.name, accepted);
        report.improved.push(ImprovedPattern {
            pattern_name: pattern.name.clone(),
            new_confidence,
        });
    }

    if let Err(err) = persist_insights(Path::new(&config.insights_dir), language_id, &persisted) {
        tracing::warn!(error = %err, "failed to persist learner insights");
    }

    report
}
