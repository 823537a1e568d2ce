use phf::{Map, Set, phf_map, phf_set};

/// One-letter code used when a residue name is absent from both mapping
/// tables.
pub const UNKNOWN_RESIDUE_CODE: char = 'X';

static BACKBONE_ATOM_NAMES: Set<&'static str> = phf_set! {
    "N", "CA", "C", "O",
};

static RESIDUE_THREE_TO_ONE: Map<&'static str, char> = phf_map! {
    "ALA" => 'A', "ARG" => 'R', "ASN" => 'N', "ASP" => 'D', "CYS" => 'C',
    "GLN" => 'Q', "GLU" => 'E', "GLY" => 'G', "HIS" => 'H', "ILE" => 'I',
    "LEU" => 'L', "LYS" => 'K', "MET" => 'M', "PHE" => 'F', "PRO" => 'P',
    "SER" => 'S', "THR" => 'T', "TRP" => 'W', "TYR" => 'Y', "VAL" => 'V',
    // Rare but standard encodings.
    "SEC" => 'U', "PYL" => 'O',
    // Protonation-state and disulfide variants emitted by modeling tools.
    "HID" => 'H', "HIE" => 'H', "HIP" => 'H',
    "HSD" => 'H', "HSE" => 'H', "HSP" => 'H',
    "CYX" => 'C', "CYM" => 'C',
};

static MODIFIED_THREE_TO_ONE: Map<&'static str, char> = phf_map! {
    "MSE" => 'M', // selenomethionine
    "CSO" => 'C', // S-hydroxycysteine
    "CSD" => 'C', // S-cysteinesulfinic acid
    "CME" => 'C', // S,S-(2-hydroxyethyl)thiocysteine
    "OCS" => 'C', // cysteine sulfonic acid
    "SEP" => 'S', // phosphoserine
    "TPO" => 'T', // phosphothreonine
    "PTR" => 'Y', // phosphotyrosine
    "MLY" => 'K', // N-dimethyl-lysine
    "KCX" => 'K', // lysine NZ-carboxylic acid
    "LLP" => 'K', // lysine-pyridoxal-5'-phosphate
    "HYP" => 'P', // 4-hydroxyproline
    "PCA" => 'E', // pyroglutamic acid
    "FME" => 'M', // N-formylmethionine
    "MLE" => 'L', // N-methylleucine
    "SAR" => 'G', // sarcosine
    "AIB" => 'A', // alpha-aminoisobutyric acid
    "DAL" => 'A', // D-alanine
    "DAR" => 'R', // D-arginine
};

/// Maps a three-letter residue name to its one-letter code.
///
/// Standard names resolve through the canonical table; names missing there
/// fall back to the modified/non-standard mapping. Returns `None` for
/// residues unknown to both (typically ligands and solvent).
pub fn one_letter_code(residue_name: &str) -> Option<char> {
    let name = residue_name.trim();
    RESIDUE_THREE_TO_ONE
        .get(name)
        .or_else(|| MODIFIED_THREE_TO_ONE.get(name))
        .copied()
}

/// Like [`one_letter_code`] but substitutes [`UNKNOWN_RESIDUE_CODE`] for
/// unknown residue names, for building sequence strings that must stay
/// aligned with the node order.
pub fn one_letter_code_lossy(residue_name: &str) -> char {
    one_letter_code(residue_name).unwrap_or(UNKNOWN_RESIDUE_CODE)
}

/// Returns `true` for the four protein backbone atom names (N, CA, C, O).
pub fn is_backbone_atom(atom_name: &str) -> bool {
    BACKBONE_ATOM_NAMES.contains(atom_name.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_residues_map_to_canonical_codes() {
        assert_eq!(one_letter_code("ALA"), Some('A'));
        assert_eq!(one_letter_code("TRP"), Some('W'));
        assert_eq!(one_letter_code("GLY"), Some('G'));
        assert_eq!(one_letter_code(" SER "), Some('S'));
    }

    #[test]
    fn protonation_variants_map_to_parent_code() {
        assert_eq!(one_letter_code("HSE"), Some('H'));
        assert_eq!(one_letter_code("HIP"), Some('H'));
        assert_eq!(one_letter_code("CYX"), Some('C'));
    }

    #[test]
    fn modified_residues_fall_back_to_parent_code() {
        assert_eq!(one_letter_code("MSE"), Some('M'));
        assert_eq!(one_letter_code("PTR"), Some('Y'));
        assert_eq!(one_letter_code("SEP"), Some('S'));
    }

    #[test]
    fn unknown_names_are_lossy_x() {
        assert_eq!(one_letter_code("HOH"), None);
        assert_eq!(one_letter_code("HEM"), None);
        assert_eq!(one_letter_code_lossy("HOH"), 'X');
        assert_eq!(one_letter_code_lossy("LEU"), 'L');
    }

    #[test]
    fn backbone_atoms_are_exactly_the_four_mainchain_names() {
        for name in ["N", "CA", "C", "O"] {
            assert!(is_backbone_atom(name));
        }
        assert!(is_backbone_atom(" CA "));
        assert!(!is_backbone_atom("CB"));
        assert!(!is_backbone_atom("OXT"));
        assert!(!is_backbone_atom("ca"));
    }
}
