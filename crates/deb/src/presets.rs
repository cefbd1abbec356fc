use std::collections::BTreeMap;

use crate::{
    error::ConfigurationError,
    organism::{Organism, OrganismParams},
};

const BUILTIN: &str = include_str!("presets.toml");

/// A named table of species parameter sets.
///
/// Each top-level TOML table is one species, with fields matching
/// [`OrganismParams`]:
///
/// ```
/// use debsim::Presets;
///
/// let presets = Presets::from_toml_str(r#"
///     [snail]
///     p_am = 20.0
///     v = 0.01
///     p_m = 10.0
///     e_g = 2500.0
///     kappa = 0.9
///     kap_r = 0.95
///     k_j = 0.002
///     e_hb = 0.5
///     e_hp = 50.0
///     v_0 = 1e-4
///     eta_m = [[0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 0.0]]
/// "#).unwrap();
///
/// assert!(presets.organism("snail").is_ok());
/// assert!(presets.get("whale").is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Presets {
    species: BTreeMap<String, OrganismParams>,
}

impl Presets {
    /// Returns the presets shipped with this crate.
    #[must_use]
    pub fn builtin() -> Self {
        // Known-good table, unwrap is safe
        Self::from_toml_str(BUILTIN).unwrap()
    }

    /// Parses a preset table from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::Parse`] if the text is not valid TOML or
    /// a species is missing a required field.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigurationError> {
        let species = toml::from_str(text)?;
        Ok(Self { species })
    }

    /// Returns the raw parameters for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::UnknownPreset`] if no such species exists.
    pub fn get(&self, name: &str) -> Result<&OrganismParams, ConfigurationError> {
        self.species
            .get(name)
            .ok_or_else(|| ConfigurationError::UnknownPreset(name.to_owned()))
    }

    /// Returns the validated organism for `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the species is unknown or its parameters are
    /// invalid.
    pub fn organism(&self, name: &str) -> Result<Organism, ConfigurationError> {
        Organism::new(self.get(name)?.clone())
    }

    /// Returns the species names in alphabetical order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.species.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn builtin_species_are_valid() {
        let presets = Presets::builtin();
        assert_eq!(presets.names().collect::<Vec<_>>(), vec!["mouse", "shark"]);

        for name in presets.names() {
            presets
                .organism(name)
                .unwrap_or_else(|error| panic!("{name} is invalid: {error}"));
        }
    }

    #[test]
    fn mouse_carries_lactation_parameters() {
        let mouse = Presets::builtin().organism("mouse").unwrap();
        assert_eq!(mouse.e_hx, Some(60.0));
        assert_eq!(mouse.t_0, Some(5.0));
        assert_relative_eq!(mouse.e_0, mouse.e_m() * mouse.v_0);
    }

    #[test]
    fn unknown_species() {
        let error = Presets::builtin().get("dodo").unwrap_err();
        assert!(matches!(error, ConfigurationError::UnknownPreset(name) if name == "dodo"));
    }

    #[test]
    fn missing_field_is_a_parse_error() {
        let result = Presets::from_toml_str("[blob]\np_am = 1.0\n");
        assert!(matches!(result, Err(ConfigurationError::Parse(_))));
    }

    #[test]
    fn extra_fields_are_ignored() {
        let text = r#"
            [eel]
            source = "field notes"
            p_am = 50.0
            v = 0.02
            p_m = 12.0
            e_g = 3000.0
            kappa = 0.7
            kap_r = 0.95
            k_j = 0.002
            e_hb = 1.0
            e_hp = 100.0
            v_0 = 1e-3
            eta_m = [[0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 0.0]]
        "#;

        let presets = Presets::from_toml_str(text).expect("valid table");
        assert!(presets.organism("eel").is_ok());
    }
}
