use phf::{Map, phf_map};

/// A target element: atomic number, molar mass [g/mol] and density [g/cm³].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Element {
    pub symbol: &'static str,
    pub atomic_number: f64,
    pub atomic_mass: f64,
    pub density: f64,
}

static ELEMENTS: Map<&'static str, Element> = phf_map! {
    "H" => Element { symbol: "H", atomic_number: 1.0, atomic_mass: 1.008, density: 8.99e-5 },
    "He" => Element { symbol: "He", atomic_number: 2.0, atomic_mass: 4.0026, density: 1.785e-4 },
    "Be" => Element { symbol: "Be", atomic_number: 4.0, atomic_mass: 9.0122, density: 1.848 },
    "C" => Element { symbol: "C", atomic_number: 6.0, atomic_mass: 12.011, density: 2.0 },
    "N" => Element { symbol: "N", atomic_number: 7.0, atomic_mass: 14.007, density: 1.165e-3 },
    "O" => Element { symbol: "O", atomic_number: 8.0, atomic_mass: 15.999, density: 1.332e-3 },
    "Al" => Element { symbol: "Al", atomic_number: 13.0, atomic_mass: 26.982, density: 2.699 },
    "Si" => Element { symbol: "Si", atomic_number: 14.0, atomic_mass: 28.085, density: 2.33 },
    "Ar" => Element { symbol: "Ar", atomic_number: 18.0, atomic_mass: 39.948, density: 1.662e-3 },
    "Fe" => Element { symbol: "Fe", atomic_number: 26.0, atomic_mass: 55.845, density: 7.874 },
    "Cu" => Element { symbol: "Cu", atomic_number: 29.0, atomic_mass: 63.546, density: 8.96 },
    "W" => Element { symbol: "W", atomic_number: 74.0, atomic_mass: 183.84, density: 19.3 },
    "Pb" => Element { symbol: "Pb", atomic_number: 82.0, atomic_mass: 207.2, density: 11.35 },
    "U" => Element { symbol: "U", atomic_number: 92.0, atomic_mass: 238.03, density: 18.95 },
};

/// Looks up a target element by its chemical symbol (case-sensitive).
pub fn lookup(symbol: &str) -> Option<&'static Element> {
    ELEMENTS.get(symbol)
}

/// Every known chemical symbol, in no particular order.
pub fn symbols() -> impl Iterator<Item = &'static str> {
    ELEMENTS.keys().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_symbols_resolve() {
        let tungsten = lookup("W").unwrap();
        assert_eq!(tungsten.atomic_number, 74.0);
        assert_eq!(tungsten.symbol, "W");
        assert!(lookup("w").is_none());
        assert!(lookup("Xx").is_none());
    }

    #[test]
    fn table_is_self_consistent() {
        for symbol in symbols() {
            let element = lookup(symbol).unwrap();
            assert_eq!(element.symbol, symbol);
            assert!(element.atomic_mass >= element.atomic_number);
            assert!(element.density > 0.0);
        }
    }
}
