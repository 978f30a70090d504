//! Schema registry: feature order, target classes, and categorical encodings
//!
//! Loaded once at process start from a YAML artifact and immutable
//! afterward. Every other component reads feature positions and class
//! names from here.

use diapredict_core::{Error, InputRecord, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Model schema: the ordered feature list, the target class names, and
/// the categorical-to-numeric encodings the trained model expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    /// Feature names in vector order; position i defines slot i
    pub feature_names: Vec<String>,

    /// Target class names; index = class id returned by the model
    pub target_names: Vec<String>,

    /// Per-feature string-category to numeric-code tables
    #[serde(default)]
    pub categorical_mapping: HashMap<String, HashMap<String, f64>>,

    /// Human-facing field name -> canonical feature name, used in both
    /// directions when resolving request fields
    #[serde(default = "default_aliases")]
    pub aliases: HashMap<String, String>,
}

impl Schema {
    /// Load and validate a schema from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::config(format!(
                "failed to read schema file {:?}: {e}",
                path.as_ref()
            ))
        })?;
        Self::from_yaml(&contents)
    }

    /// Parse and validate a schema from YAML text
    pub fn from_yaml(contents: &str) -> Result<Self> {
        let schema: Schema = serde_yaml::from_str(contents)
            .map_err(|e| Error::config(format!("malformed schema: {e}")))?;
        schema.validate()?;
        Ok(schema)
    }

    /// Number of features, and therefore the encoded vector length
    pub fn num_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Whether a feature is categorically encoded
    pub fn is_categorical(&self, feature: &str) -> bool {
        self.categorical_mapping.contains_key(feature)
    }

    /// Resolve a request field for a canonical feature name.
    ///
    /// Lookup order: the canonical name itself, then the alias table in
    /// both directions (a record may carry either the localized or the
    /// canonical spelling). Key comparison is ASCII-case-insensitive
    /// because records come from callers with inconsistent casing.
    pub fn resolve_field<'a>(&self, record: &'a InputRecord, feature: &str) -> Option<&'a Value> {
        if let Some(value) = lookup(record, feature) {
            return Some(value);
        }

        for (alias, canonical) in &self.aliases {
            if canonical.eq_ignore_ascii_case(feature) {
                if let Some(value) = lookup(record, alias) {
                    return Some(value);
                }
            }
            if alias.eq_ignore_ascii_case(feature) {
                if let Some(value) = lookup(record, canonical) {
                    return Some(value);
                }
            }
        }

        None
    }

    fn validate(&self) -> Result<()> {
        if self.feature_names.is_empty() {
            return Err(Error::config("schema has no feature names"));
        }
        if self.target_names.is_empty() {
            return Err(Error::config("schema has no target names"));
        }

        let mut seen = std::collections::HashSet::new();
        for name in &self.feature_names {
            if !seen.insert(name.as_str()) {
                return Err(Error::config(format!("duplicate feature name: {name}")));
            }
        }

        let mut seen = std::collections::HashSet::new();
        for name in &self.target_names {
            if !seen.insert(name.as_str()) {
                return Err(Error::config(format!("duplicate target name: {name}")));
            }
        }

        for key in self.categorical_mapping.keys() {
            if !self.feature_names.iter().any(|f| f == key) {
                return Err(Error::config(format!(
                    "categorical mapping references unknown feature: {key}"
                )));
            }
        }

        Ok(())
    }
}

/// Case-insensitive field lookup within one record
fn lookup<'a>(record: &'a InputRecord, name: &str) -> Option<&'a Value> {
    if let Some(value) = record.get(name) {
        return Some(value);
    }
    record
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value)
}

/// Built-in alias table pairing English field names with the canonical
/// (Spanish) feature names of the trained model. Schemas may override
/// this with their own `aliases` section.
pub fn default_aliases() -> HashMap<String, String> {
    [
        ("age", "edad"),
        ("genetic_markers", "marcadores_geneticos"),
        ("autoantibodies", "autoanticuerpos"),
        ("family_history", "antecedentes_familiares"),
        ("environmental_factors", "factores_ambientales"),
        ("ethnicity", "etnicidad"),
        ("dietary_habits", "habitos_alimenticios"),
        ("glucose_tolerance_test", "prueba_tolerancia_glucosa"),
        ("liver_function_tests", "pruebas_funcion_hepatica"),
        ("cystic_fibrosis_diagnosis", "diagnostico_fibrosis_quistica"),
        ("steroid_use", "uso_esteroides"),
        ("genetic_testing", "pruebas_geneticas"),
        ("pregnancy_history", "historial_embarazos"),
        ("previous_gestational_diabetes", "diabetes_gestacional_previa"),
        ("pcos_history", "historial_pcos"),
        ("smoking_status", "estado_tabaquismo"),
        ("early_onset_symptoms", "sintomas_inicio_temprano"),
        ("socioeconomic_factors", "factores_socioeconomicos"),
        ("alcohol_consumption", "consumo_alcohol"),
        ("physical_activity", "actividad_fisica"),
        ("urine_test", "prueba_orina"),
        ("insulin_levels", "niveles_insulina"),
        ("bmi", "indice_masa_corporal"),
        ("blood_pressure", "presion_arterial"),
        ("cholesterol_levels", "niveles_colesterol"),
        ("waist_circumference", "circunferencia_cintura"),
        ("glucose_levels", "niveles_glucosa"),
        ("pregnancy_weight_gain", "aumento_peso_embarazo"),
        ("pancreatic_health", "salud_pancreatica"),
        ("pulmonary_function", "funcion_pulmonar"),
        ("neurological_assessments", "evaluaciones_neurologicas"),
        ("digestive_enzyme_levels", "niveles_enzimas_digestivas"),
        ("birth_weight", "peso_nacimiento"),
    ]
    .into_iter()
    .map(|(alias, canonical)| (alias.to_string(), canonical.to_string()))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> InputRecord {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_parse_schema() {
        let yaml = r#"
feature_names: [edad, niveles_glucosa, autoanticuerpos]
target_names: ["Type 1 Diabetes", "Type 2 Diabetes"]
categorical_mapping:
  autoanticuerpos:
    Negative: 0
    Positive: 1
"#;

        let schema = Schema::from_yaml(yaml).unwrap();
        assert_eq!(schema.num_features(), 3);
        assert_eq!(schema.target_names.len(), 2);
        assert!(schema.is_categorical("autoanticuerpos"));
        assert!(!schema.is_categorical("edad"));
        // Built-in aliases fill in when the file has no aliases section
        assert_eq!(schema.aliases.get("age").unwrap(), "edad");
    }

    #[test]
    fn test_missing_categorical_mapping_degrades_to_empty() {
        let yaml = r#"
feature_names: [edad]
target_names: [Healthy]
"#;
        let schema = Schema::from_yaml(yaml).unwrap();
        assert!(schema.categorical_mapping.is_empty());
    }

    #[test]
    fn test_rejects_missing_required_keys() {
        assert!(Schema::from_yaml("feature_names: [edad]").is_err());
        assert!(Schema::from_yaml("target_names: [Healthy]").is_err());
        assert!(Schema::from_yaml("not yaml: [").is_err());
    }

    #[test]
    fn test_rejects_unknown_categorical_feature() {
        let yaml = r#"
feature_names: [edad]
target_names: [Healthy]
categorical_mapping:
  etnicidad:
    Low Risk: 0
"#;
        assert!(Schema::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_rejects_duplicate_feature_names() {
        let yaml = r#"
feature_names: [edad, edad]
target_names: [Healthy]
"#;
        assert!(Schema::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_rejects_duplicate_target_names() {
        // A repeated class name would collapse keys in the per-class
        // probability map and lose probability mass
        let yaml = r#"
feature_names: [edad]
target_names: ["Type 2 Diabetes", "Type 2 Diabetes", "Prediabetic"]
"#;
        assert!(Schema::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_resolve_field_direct_and_aliased() {
        let yaml = r#"
feature_names: [niveles_glucosa]
target_names: [Healthy]
"#;
        let schema = Schema::from_yaml(yaml).unwrap();

        let direct = record(json!({"niveles_glucosa": 120}));
        assert_eq!(
            schema.resolve_field(&direct, "niveles_glucosa").unwrap(),
            &json!(120)
        );

        // English alias resolves to the canonical feature
        let aliased = record(json!({"glucose_levels": 120}));
        assert!(schema.resolve_field(&aliased, "niveles_glucosa").is_some());

        // And the reverse direction: canonical record key, aliased feature
        let reverse = record(json!({"niveles_glucosa": 120}));
        assert!(schema.resolve_field(&reverse, "glucose_levels").is_some());

        // Casing does not matter
        let cased = record(json!({"Niveles_Glucosa": 120}));
        assert!(schema.resolve_field(&cased, "niveles_glucosa").is_some());

        let absent = record(json!({"edad": 40}));
        assert!(schema.resolve_field(&absent, "niveles_glucosa").is_none());
    }
}
