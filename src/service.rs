//! Serving side of the predictor.
//!
//! A [`context::ServiceContext`] bundles everything loaded at start-up (model,
//! normalizer, specialist and description resolvers, configuration). It is
//! immutable; live reload swaps a whole new context through
//! [`context::SharedContext`]. [`prediction::PredictionService`] turns a list
//! of symptom strings into ranked, enriched result records.

pub mod config;
pub mod context;
pub mod prediction;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::analysis::normalizer::TextNormalizer;
    use crate::lookup::table::LookupTable;
    use crate::ml::training::{TrainingConfig, read_dataset, train};
    use crate::service::config::PredictorConfig;
    use crate::service::context::ServiceContext;

    /// Three classes with three rows each, so the priors are equal.
    pub const DATASET: &str = "\
Disease,Symptom_1,Symptom_2,Symptom_3
Fungal infection,itching,skin_rash,nodal_skin_eruptions
Fungal infection,itching,skin_rash,
Fungal infection,skin_rash,nodal_skin_eruptions,
Allergy,continuous_sneezing,shivering,chills
Allergy,continuous_sneezing,chills,
Allergy,shivering,watering_from_eyes,
Malaria,chills,vomiting,high_fever
Malaria,high_fever,sweating,vomiting
Malaria,high_fever,headache,
";

    pub fn fixture_context() -> ServiceContext {
        let normalizer = TextNormalizer::standard().unwrap();
        let records = read_dataset(DATASET.as_bytes(), &normalizer).unwrap();
        let config = TrainingConfig {
            test_ratio: 0.0,
            ..TrainingConfig::default()
        };
        let model = train(&records, &config).unwrap().model;

        let specialists = LookupTable::from_pairs(
            [
                ("Fungal infection", "Dermatologist"),
                ("Allergy", "Allergist"),
            ],
            &normalizer,
        );
        let descriptions = LookupTable::from_pairs(
            [
                ("Fungal Infection ", "A skin infection caused by fungi."),
                ("Alergy", "An immune reaction to a harmless substance."),
                ("Malaria", "A mosquito-borne infectious disease."),
            ],
            &normalizer,
        );

        ServiceContext::new(model, specialists, descriptions, PredictorConfig::default()).unwrap()
    }
}
