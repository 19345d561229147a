//! End-to-end mapping through on-disk stores.

use std::path::Path;

use pdbmapper::mapper::Builder;
use pdbmapper::mapper::Unit;
use pdbmapper::Mapper;
use tempdir::TempDir;

/// Writes the stores under `dir` and builds a mapper thresholded at 80%
/// identity.
fn mapper(dir: &Path) -> Result<Mapper, Box<dyn std::error::Error>> {
    let interfaces = dir.join("intDB");
    let variants = dir.join("varDB");
    std::fs::create_dir_all(&interfaces)?;
    std::fs::create_dir_all(&variants)?;

    std::fs::write(
        interfaces.join("P1.txt"),
        "Protein_accession,Structure_feature_id,Protein_start_position,\
         Protein_end_position,Pident\n\
         P1,F1,100,110,90\n",
    )?;

    std::fs::write(
        variants.join("G1.vep.gz"),
        gzip(
            "## ENSEMBL VARIANT EFFECT PREDICTOR\n\
             #Uploaded_variation\tGene\tFeature\tConsequence\tProtein_position\n\
             V1\tG1\tT1\tmissense_variant\t105\n\
             V2\tG1\tT1\tmissense_variant\t200\n",
        )?,
    )?;

    let mapper = Builder::default()
        .interface_store(interfaces)?
        .variant_store(variants)?
        .out_dir(dir.join("out"))?
        .pident(80)?
        .try_build()?;

    std::fs::create_dir_all(mapper.out_dir())?;

    Ok(mapper)
}

/// Compresses `data` with gzip.
fn gzip(data: &str) -> std::io::Result<Vec<u8>> {
    use std::io::Write as _;

    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data.as_bytes())?;
    encoder.finish()
}

#[test]
fn set_id_file_holds_only_contained_variants() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new("pdbmapper")?;
    let mapper = mapper(dir.path())?;

    mapper.run(&Unit::new("P1", "G1", "T1"), true)?;

    let set_ids = std::fs::read_to_string(dir.path().join("out").join("setID_pident80.File"))?;
    assert_eq!(set_ids, "Structure_feature_id,Uploaded_variation\nF1,V1\n");
    assert!(!set_ids.contains("V2"));

    let mapped = std::fs::read_to_string(
        dir.path()
            .join("out")
            .join("MappedVariants_pident80_isoform_None_consequence_None.File"),
    )?;
    assert_eq!(mapped.lines().count(), 2);
    assert!(!mapped.contains("V2"));

    // The location view keeps the unmatched variant.
    let located =
        std::fs::read_to_string(dir.path().join("out").join("LocatedVariants_pident80.File"))?;
    assert_eq!(located.lines().count(), 3);
    assert!(located.contains("V2"));

    Ok(())
}

#[test]
fn inner_join_rows_are_present_in_the_outer_join() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new("pdbmapper")?;
    let mapper = mapper(dir.path())?;

    let mapping = mapper.map(&Unit::new("P1", "G1", "T1"))?;
    assert!(mapping.located().len() >= mapping.mapped().len());

    for row in mapping.mapped().rows() {
        assert!(mapping.located().rows().contains(row));
    }

    Ok(())
}

#[test]
fn absent_transcript_is_an_error() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new("pdbmapper")?;
    let mapper = mapper(dir.path())?;

    let err = mapper.map(&Unit::new("P1", "G1", "T9")).unwrap_err();
    assert!(err.is_skippable());
    assert!(!dir.path().join("out").join("setID_pident80.File").exists());

    Ok(())
}
