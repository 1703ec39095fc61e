use phf::{Map, phf_map};

static ELEMENT_NUMBERS: Map<&'static str, u32> = phf_map! {
    "H" => 1, "He" => 2,
    "Li" => 3, "Be" => 4, "B" => 5, "C" => 6, "N" => 7, "O" => 8, "F" => 9, "Ne" => 10,
    "Na" => 11, "Mg" => 12, "Al" => 13, "Si" => 14, "P" => 15, "S" => 16, "Cl" => 17, "Ar" => 18,
    "K" => 19, "Ca" => 20, "Ti" => 22, "Cr" => 24, "Mn" => 25, "Fe" => 26, "Co" => 27,
    "Ni" => 28, "Cu" => 29, "Zn" => 30, "As" => 33, "Se" => 34, "Br" => 35, "Kr" => 36,
    "Mo" => 42, "Ag" => 47, "Cd" => 48, "Sn" => 50, "Sb" => 51, "Te" => 52, "I" => 53,
    "Pt" => 78, "Au" => 79, "Hg" => 80, "Pb" => 82,
};

pub fn atomic_number(symbol: &str) -> Option<u32> {
    ELEMENT_NUMBERS.get(symbol.trim()).copied()
}

pub fn is_known_element(symbol: &str) -> bool {
    atomic_number(symbol).is_some()
}
