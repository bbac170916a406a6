//! Start-up state shared by every request.

use std::path::Path;
use std::sync::Arc;

use log::info;
use parking_lot::RwLock;

use crate::analysis::normalizer::TextNormalizer;
use crate::error::Result;
use crate::lookup::csv::{ReferenceKind, load_reference_table};
use crate::lookup::resolver::EntityResolver;
use crate::lookup::table::LookupTable;
use crate::ml::model::TrainedModel;
use crate::service::config::PredictorConfig;

/// Immutable bundle of the trained model, the normalizer and both resolvers.
///
/// Built once at start-up and never mutated afterwards, so it can be read by
/// any number of threads without locking.
#[derive(Debug)]
pub struct ServiceContext {
    model: TrainedModel,
    normalizer: TextNormalizer,
    specialists: EntityResolver,
    descriptions: EntityResolver,
    config: PredictorConfig,
}

impl ServiceContext {
    /// Assemble a context from already loaded parts.
    pub fn new(
        model: TrainedModel,
        specialists: LookupTable,
        descriptions: LookupTable,
        config: PredictorConfig,
    ) -> Result<Self> {
        config.validate()?;
        let normalizer = TextNormalizer::standard()?;
        let (specialists, descriptions) =
            config.build_resolvers(specialists, descriptions, &normalizer)?;

        Ok(Self {
            model,
            normalizer,
            specialists,
            descriptions,
            config,
        })
    }

    /// Load the model artifact and both reference tables from disk.
    pub fn from_paths<M, S, D>(
        model_path: M,
        specialists_path: S,
        descriptions_path: D,
        config: PredictorConfig,
    ) -> Result<Self>
    where
        M: AsRef<Path>,
        S: AsRef<Path>,
        D: AsRef<Path>,
    {
        let model = TrainedModel::load(model_path.as_ref())?;
        info!(
            "Loaded model from {} ({} classes, {} features)",
            model_path.as_ref().display(),
            model.labels().len(),
            model.vectorizer().vocabulary_size()
        );

        let normalizer = TextNormalizer::standard()?;
        let (specialists, _) =
            load_reference_table(specialists_path, ReferenceKind::Specialist, &normalizer)?;
        let (descriptions, _) =
            load_reference_table(descriptions_path, ReferenceKind::Description, &normalizer)?;

        Self::new(model, specialists, descriptions, config)
    }

    pub fn model(&self) -> &TrainedModel {
        &self.model
    }

    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    pub fn specialists(&self) -> &EntityResolver {
        &self.specialists
    }

    pub fn descriptions(&self) -> &EntityResolver {
        &self.descriptions
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }
}

/// Holder for the current [`ServiceContext`] that supports atomic replacement.
///
/// Readers clone the inner `Arc` and work on that snapshot; a replacement
/// never affects a request that has already taken its snapshot.
#[derive(Debug)]
pub struct SharedContext {
    current: RwLock<Arc<ServiceContext>>,
}

impl SharedContext {
    pub fn new(context: ServiceContext) -> Self {
        Self {
            current: RwLock::new(Arc::new(context)),
        }
    }

    /// The context in effect right now.
    ///
    /// The read lock is held only while the `Arc` is cloned.
    pub fn snapshot(&self) -> Arc<ServiceContext> {
        self.current.read().clone()
    }

    /// Swap in a new context, returning the previous one.
    pub fn replace(&self, context: ServiceContext) -> Arc<ServiceContext> {
        let mut guard = self.current.write();
        std::mem::replace(&mut *guard, Arc::new(context))
    }
}

impl From<ServiceContext> for SharedContext {
    fn from(context: ServiceContext) -> Self {
        Self::new(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::resolver::Resolution;
    use crate::service::test_support::fixture_context;

    #[test]
    fn test_context_resolvers() {
        let context = fixture_context();
        assert_eq!(context.specialists().resolve_or_default("Allergy"), "Allergist");
        assert_eq!(
            context.specialists().resolve_or_default("Malaria"),
            "No specialist found."
        );
        assert!(matches!(
            context.descriptions().resolve("Allergy"),
            Resolution::Fuzzy { key: "alergy", .. }
        ));
        assert_eq!(context.model().labels().len(), 3);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let base = fixture_context();
        let config = PredictorConfig {
            fuzzy_cutoff: 2.0,
            ..PredictorConfig::default()
        };
        let result = ServiceContext::new(
            base.model().clone(),
            base.specialists().table().clone(),
            base.descriptions().table().clone(),
            config,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_snapshot_survives_replace() {
        let shared = SharedContext::new(fixture_context());
        let before = shared.snapshot();

        let config = PredictorConfig {
            top_n: 1,
            ..PredictorConfig::default()
        };
        let replacement = ServiceContext::new(
            before.model().clone(),
            before.specialists().table().clone(),
            before.descriptions().table().clone(),
            config,
        )
        .unwrap();

        let previous = shared.replace(replacement);
        assert!(Arc::ptr_eq(&previous, &before));
        assert_eq!(before.config().top_n, 3);
        assert_eq!(shared.snapshot().config().top_n, 1);
    }
}
