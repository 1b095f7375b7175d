use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::{DisplayStyle, InputType};
use crate::{slugify, ConfigError};

/// Upper bound on fields per set, matching the admin API's write validation.
pub const MAX_FIELDS_PER_SET: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedField {
    pub label: String,
    #[serde(default)]
    pub input_type: InputType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub placeholder: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedSet {
    pub name: String,
    #[serde(default = "default_trigger_variant")]
    pub trigger_variant: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub note_title: String,
    #[serde(default)]
    pub note_content: String,
    #[serde(default)]
    pub require_nearest_size: bool,
    #[serde(default)]
    pub display_style: DisplayStyle,
    pub fields: Vec<SeedField>,
}

fn default_trigger_variant() -> String {
    "Custom Size".to_string()
}

#[derive(Debug, Deserialize)]
pub struct SeedFile {
    pub sets: Vec<SeedSet>,
}

/// Load and validate a size-set seed file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_seed_file(path: &Path) -> Result<SeedFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SeedFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let seed_file: SeedFile = serde_yaml::from_str(&content)?;

    validate_seed_file(&seed_file)?;

    Ok(seed_file)
}

fn validate_seed_file(seed_file: &SeedFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();

    for set in &seed_file.sets {
        if set.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "set name must be non-empty".to_string(),
            ));
        }

        if slugify(&set.trigger_variant).is_empty() {
            return Err(ConfigError::Validation(format!(
                "set '{}' has trigger variant '{}' that slugifies to nothing",
                set.name, set.trigger_variant
            )));
        }

        let lower_name = set.name.to_lowercase();
        if !seen_names.insert(lower_name) {
            return Err(ConfigError::Validation(format!(
                "duplicate set name: '{}'",
                set.name
            )));
        }

        if set.fields.len() > MAX_FIELDS_PER_SET {
            return Err(ConfigError::Validation(format!(
                "set '{}' has {} fields; maximum is {}",
                set.name,
                set.fields.len(),
                MAX_FIELDS_PER_SET
            )));
        }

        let mut seen_labels = HashSet::new();
        for field in &set.fields {
            if field.label.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "set '{}' has a field with an empty label",
                    set.name
                )));
            }
            if !seen_labels.insert(field.label.to_lowercase()) {
                return Err(ConfigError::Validation(format!(
                    "set '{}' has duplicate field label: '{}'",
                    set.name, field.label
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_set(name: &str) -> SeedSet {
        SeedSet {
            name: name.to_string(),
            trigger_variant: "Custom Size".to_string(),
            image_url: None,
            note_title: String::new(),
            note_content: String::new(),
            require_nearest_size: false,
            display_style: DisplayStyle::Inline,
            fields: vec![SeedField {
                label: "Chest".to_string(),
                input_type: InputType::Number,
                required: true,
                placeholder: "in inches".to_string(),
            }],
        }
    }

    #[test]
    fn parses_minimal_yaml() {
        let yaml = "\
sets:
  - name: Tailored Shirt
    fields:
      - label: Chest
        input_type: number
        required: true
      - label: Sleeve
";
        let file: SeedFile = serde_yaml::from_str(yaml).unwrap();
        validate_seed_file(&file).unwrap();
        assert_eq!(file.sets.len(), 1);
        let set = &file.sets[0];
        assert_eq!(set.trigger_variant, "Custom Size");
        assert_eq!(set.display_style, DisplayStyle::Inline);
        assert_eq!(set.fields.len(), 2);
        assert_eq!(set.fields[0].input_type, InputType::Number);
        assert!(set.fields[0].required);
        assert_eq!(set.fields[1].input_type, InputType::Text);
        assert!(!set.fields[1].required);
    }

    #[test]
    fn validate_rejects_empty_name() {
        let file = SeedFile {
            sets: vec![SeedSet {
                name: "  ".to_string(),
                ..sample_set("x")
            }],
        };
        let err = validate_seed_file(&file).unwrap_err();
        assert!(err.to_string().contains("non-empty"));
    }

    #[test]
    fn validate_rejects_blank_trigger() {
        let file = SeedFile {
            sets: vec![SeedSet {
                trigger_variant: "!!!".to_string(),
                ..sample_set("Tailored Shirt")
            }],
        };
        let err = validate_seed_file(&file).unwrap_err();
        assert!(err.to_string().contains("slugifies to nothing"));
    }

    #[test]
    fn validate_rejects_duplicate_set_name() {
        let file = SeedFile {
            sets: vec![sample_set("Tailored Shirt"), sample_set("tailored shirt")],
        };
        let err = validate_seed_file(&file).unwrap_err();
        assert!(err.to_string().contains("duplicate set name"));
    }

    #[test]
    fn validate_rejects_duplicate_field_label() {
        let mut set = sample_set("Tailored Shirt");
        set.fields.push(SeedField {
            label: "chest".to_string(),
            input_type: InputType::Text,
            required: false,
            placeholder: String::new(),
        });
        let file = SeedFile { sets: vec![set] };
        let err = validate_seed_file(&file).unwrap_err();
        assert!(err.to_string().contains("duplicate field label"));
    }

    #[test]
    fn validate_rejects_too_many_fields() {
        let mut set = sample_set("Tailored Shirt");
        set.fields = (0..=MAX_FIELDS_PER_SET)
            .map(|i| SeedField {
                label: format!("Field {i}"),
                input_type: InputType::Text,
                required: false,
                placeholder: String::new(),
            })
            .collect();
        let file = SeedFile { sets: vec![set] };
        let err = validate_seed_file(&file).unwrap_err();
        assert!(err.to_string().contains("maximum is"));
    }
}
