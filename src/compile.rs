//! The data compiler: source trees in, resolved bundles out.
//!
//! Ingestion and resolution both fan out over rayon. Every locale is
//! independent, so a malformed source only removes that locale (reported
//! in [`Compilation::skipped`]) and never aborts the run. Only a dataset
//! that cannot exist at all (no root record) is fatal.

use crate::{
    config::{CompileConfig, ConfigError},
    locale::{LocaleId, TagError},
    raw::{
        Category, Dataset, DatasetError, RawRecord,
        tree::{Source, ingest},
    },
    resolve::{ResolveError, ResolvedBundle, resolve},
};
use rayon::prelude::*;
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::atomic::{AtomicBool, Ordering},
};
use thiserror::Error;
use tracing::{debug, warn};

/// A per-locale failure. The locale is skipped; compilation goes on.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CompileError {
    #[error("source `{tag}` has a malformed locale tag: {source}")]
    Tag { tag: String, source: TagError },
    #[error("{locale}: unknown category `{name}`")]
    UnknownCategory { locale: LocaleId, name: String },
    #[error("{locale}: duplicate key `{category}.{key}`")]
    DuplicateKey {
        locale: LocaleId,
        category: Category,
        key: String,
    },
    #[error("{locale}: `{category}.{key}` must be a list, found a {found}")]
    ExpectedList {
        locale: LocaleId,
        category: Category,
        key: String,
        found: &'static str,
    },
    #[error("{locale}: `{key}` is not a number: `{text}`")]
    InvalidNumber {
        locale: LocaleId,
        key: String,
        text: String,
    },
    #[error("{locale}: identity block declares `{found}`")]
    IdentityMismatch { locale: LocaleId, found: String },
    #[error("{locale}: malformed <{element}>: {reason}")]
    Malformed {
        locale: LocaleId,
        element: String,
        reason: &'static str,
    },
    #[error("{locale}: more than one source; the first one is kept")]
    DuplicateSource { locale: LocaleId },
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl CompileError {
    /// The locale this error is about, when the tag could be parsed.
    pub fn locale(&self) -> Option<&LocaleId> {
        match self {
            CompileError::Tag { .. } => None,
            CompileError::UnknownCategory { locale, .. }
            | CompileError::DuplicateKey { locale, .. }
            | CompileError::ExpectedList { locale, .. }
            | CompileError::InvalidNumber { locale, .. }
            | CompileError::IdentityMismatch { locale, .. }
            | CompileError::Malformed { locale, .. }
            | CompileError::DuplicateSource { locale }
            | CompileError::Resolve(ResolveError::UnknownLocale { locale }) => Some(locale),
        }
    }
}

/// Fatal failures: nothing could be compiled.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error("cannot start compiler worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Clone, Default)]
pub struct Compilation {
    pub bundles: BTreeMap<LocaleId, ResolvedBundle>,
    /// Per-locale failures, in source order for ingestion errors followed by
    /// resolution errors in locale order.
    pub skipped: Vec<CompileError>,
    /// Set when the run was cancelled before every locale was resolved.
    pub cancelled: bool,
}

pub fn compile(sources: &[Source], config: &CompileConfig) -> Result<Compilation, BuildError> {
    compile_with_cancel(sources, config, &AtomicBool::new(false))
}

/// Like [`compile`], checking `cancel` before each locale is resolved.
/// Bundles finished before the flag was raised are kept.
pub fn compile_with_cancel(
    sources: &[Source],
    config: &CompileConfig,
    cancel: &AtomicBool,
) -> Result<Compilation, BuildError> {
    config.validate()?;
    run_in_pool(config, || {
        let (dataset, skipped) = ingest_all(sources, config)?;
        resolve_all(&dataset, skipped, config, cancel)
    })
}

pub fn compile_dataset(dataset: &Dataset, config: &CompileConfig) -> Result<Compilation, BuildError> {
    compile_dataset_with_cancel(dataset, config, &AtomicBool::new(false))
}

pub fn compile_dataset_with_cancel(
    dataset: &Dataset,
    config: &CompileConfig,
    cancel: &AtomicBool,
) -> Result<Compilation, BuildError> {
    config.validate()?;
    run_in_pool(config, || resolve_all(dataset, Vec::new(), config, cancel))
}

fn run_in_pool<T, F>(config: &CompileConfig, job: F) -> Result<T, BuildError>
where
    T: Send,
    F: FnOnce() -> Result<T, BuildError> + Send,
{
    match config.threads {
        Some(n) => {
            let pool = rayon::ThreadPoolBuilder::new().num_threads(n).build()?;
            pool.install(job)
        }
        None => job(),
    }
}

fn ingest_all(
    sources: &[Source],
    config: &CompileConfig,
) -> Result<(Dataset, Vec<CompileError>), DatasetError> {
    let ingested: Vec<Result<RawRecord, CompileError>> =
        sources.par_iter().map(|s| ingest(s, config)).collect();

    let mut seen = BTreeSet::new();
    let mut records = Vec::with_capacity(ingested.len());
    let mut skipped = Vec::new();
    for result in ingested {
        match result {
            Ok(record) if !seen.insert(record.locale().clone()) => {
                skipped.push(CompileError::DuplicateSource {
                    locale: record.locale().clone(),
                });
            }
            Ok(record) => records.push(record),
            Err(e) => skipped.push(e),
        }
    }
    for e in &skipped {
        warn!(error = %e, "skipping locale");
    }

    let dataset = Dataset::new(records)?;
    debug!(records = dataset.len(), skipped = skipped.len(), "dataset ingested");
    Ok((dataset, skipped))
}

fn resolve_all(
    dataset: &Dataset,
    mut skipped: Vec<CompileError>,
    config: &CompileConfig,
    cancel: &AtomicBool,
) -> Result<Compilation, BuildError> {
    // A duplicate source leaves the first record in the dataset.
    let excluded: BTreeSet<&LocaleId> = skipped
        .iter()
        .filter(|e| !matches!(e, CompileError::DuplicateSource { .. }))
        .filter_map(CompileError::locale)
        .collect();
    let filter = config.locale_filter()?;

    let targets: Vec<LocaleId> = dataset
        .locales()
        .flat_map(LocaleId::ancestors)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .filter(|id| !excluded.contains(id))
        .filter(|id| filter.as_ref().is_none_or(|f| f.contains(id)))
        .collect();
    debug!(targets = targets.len(), "resolving locales");

    let results: Vec<Option<Result<ResolvedBundle, ResolveError>>> = targets
        .par_iter()
        .map(|id| {
            if cancel.load(Ordering::Relaxed) {
                return None;
            }
            Some(resolve(id, dataset))
        })
        .collect();

    let mut compilation = Compilation::default();
    for result in results {
        match result {
            Some(Ok(bundle)) => {
                compilation.bundles.insert(bundle.locale().clone(), bundle);
            }
            Some(Err(e)) => {
                warn!(error = %e, "skipping locale");
                skipped.push(e.into());
            }
            None => compilation.cancelled = true,
        }
    }
    compilation.skipped = skipped;
    if compilation.cancelled {
        warn!(compiled = compilation.bundles.len(), "compilation cancelled");
    }
    debug!(
        bundles = compilation.bundles.len(),
        skipped = compilation.skipped.len(),
        "compilation finished"
    );
    Ok(compilation)
}
