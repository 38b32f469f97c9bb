//! Display names of the Sustainable Development Goals (ODS).

use std::borrow::Cow;

use crate::dataset::Label;

/// Spanish names of the 17 goals, indexed by `label - 1`.
pub const ODS_NAMES: [&str; 17] = [
    "Fin de la pobreza",
    "Hambre cero",
    "Salud y bienestar",
    "Educación de calidad",
    "Igualdad de género",
    "Agua limpia y saneamiento",
    "Energía asequible y no contaminante",
    "Trabajo decente y crecimiento económico",
    "Industria, innovación e infraestructura",
    "Reducción de las desigualdades",
    "Ciudades y comunidades sostenibles",
    "Producción y consumo responsables",
    "Acción por el clima",
    "Vida submarina",
    "Vida de ecosistemas terrestres",
    "Paz, justicia e instituciones sólidas",
    "Alianzas para lograr los objetivos",
];

/// Name of a known goal.
pub fn name_of(label: Label) -> Option<&'static str> {
    usize::try_from(label)
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|index| ODS_NAMES.get(index).copied())
}

/// Name of a goal, or `ODS <n>` for unknown labels.
pub fn display_name(label: Label) -> Cow<'static, str> {
    match name_of(label) {
        Some(name) => Cow::Borrowed(name),
        None => Cow::Owned(format!("ODS {label}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(name_of(1), Some("Fin de la pobreza"));
        assert_eq!(name_of(17), Some("Alianzas para lograr los objetivos"));
        assert_eq!(name_of(0), None);
        assert_eq!(name_of(18), None);
        assert_eq!(display_name(3), "Salud y bienestar");
        assert_eq!(display_name(-1), "ODS -1");
    }
}
