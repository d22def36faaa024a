//! Real Paris landmarks for realistic test fixtures.
//!
//! Coordinates sourced from OpenStreetMap.

/// A named location with coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Location {
    pub name: &'static str,
    pub category: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, category: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, category, lat, lng }
    }
}

// ============================================================================
// Left/Right Bank, west to east
// ============================================================================

pub const EIFFEL_TOWER: Location = Location::new("Eiffel Tower", "sight", 48.8583701, 2.2944813);
pub const ARC_DE_TRIOMPHE: Location = Location::new("Arc de Triomphe", "sight", 48.8737917, 2.2950275);
pub const MUSEE_DORSAY: Location = Location::new("Musée d'Orsay", "museum", 48.8599614, 2.3265614);
pub const LOUVRE: Location = Location::new("Musée du Louvre", "museum", 48.8606111, 2.337644);
pub const SAINTE_CHAPELLE: Location = Location::new("Sainte-Chapelle", "sight", 48.8553966, 2.3450136);
pub const NOTRE_DAME: Location = Location::new("Notre-Dame de Paris", "sight", 48.852968, 2.3499021);
pub const PANTHEON: Location = Location::new("Panthéon", "sight", 48.8462218, 2.3464138);
pub const LE_MARAIS_BISTRO: Location = Location::new("Chez Janou", "food", 48.8583, 2.3662);
pub const PERE_LACHAISE: Location = Location::new("Père Lachaise", "walk", 48.8614, 2.3933);

// ============================================================================
// Montmartre (north)
// ============================================================================

pub const SACRE_COEUR: Location = Location::new("Sacré-Cœur", "sight", 48.886705, 2.3431043);
pub const MONTMARTRE_CAFE: Location = Location::new("Le Consulat", "food", 48.8863, 2.3405);

/// Strip of stops ordered west to east, useful for route tests.
pub const WEST_TO_EAST: &[Location] = &[
    EIFFEL_TOWER,
    MUSEE_DORSAY,
    LOUVRE,
    SAINTE_CHAPELLE,
    NOTRE_DAME,
    LE_MARAIS_BISTRO,
    PERE_LACHAISE,
];
