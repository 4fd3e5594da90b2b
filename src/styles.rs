use std::collections::HashMap;

use lazy_static::lazy_static;

/// The eight canonical style categories, in catalog order.
pub const CATEGORIES: [&str; 8] = [
    "Natural",
    "Clássico",
    "Contemporâneo",
    "Elegante",
    "Romântico",
    "Sexy",
    "Dramático",
    "Criativo",
];

/// Built-in descriptions, aligned with `CATEGORIES`.
const DESCRIPTIONS: [&str; 8] = [
    "Conforto em primeiro lugar: peças práticas, tecidos leves e pouca produção.",
    "Guarda-roupa atemporal, cortes tradicionais e combinações discretas.",
    "Atualizada sem ser escrava de tendência: básicos com toques do momento.",
    "Refinamento nos detalhes, caimento impecável e paleta sóbria.",
    "Delicadeza nas formas: babados, florais e tons suaves.",
    "Valoriza as curvas e gosta de ser notada: decotes, fendas e ajuste ao corpo.",
    "Presença marcante: estruturas firmes, contrastes e peças de impacto.",
    "Mistura inesperada de cores, texturas e referências; nada de óbvio.",
];

lazy_static! {
    static ref CATALOG: HashMap<&'static str, &'static str> = CATEGORIES
        .iter()
        .zip(DESCRIPTIONS)
        .map(|(&category, description)| (category, description))
        .collect();
}

/// Built-in description for a category, shown when the backend's style
/// payload does not cover it.
pub fn describe(category: &str) -> Option<&'static str> {
    CATALOG.get(category).copied()
}
