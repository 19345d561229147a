//! `pdbmapper` is a crate for mapping annotated genomic variants onto the
//! residues of protein interfaces.
//!
//! The crate works on two collections of delimited text files:
//!
//! - an **interface store**, holding per-protein records of structural
//!   interface features (a residue range, the features it belongs to, and
//!   the sequence identity between the protein and the structure it was
//!   derived from), and
//! - a **variant store**, holding per-gene records of variant effect
//!   annotations (such as the output of Ensembl VEP) with the protein
//!   position each variant affects.
//!
//! Both stores are accessed through a [`Store`], which reads only the lines
//! belonging to an identifier. Records often compact several values into one
//! cell (`[F1, F2]`) or into a dash-joined range (`120-123`); the [`expand`]
//! and [`resolve`] modules normalize these into one row per value before the
//! records are parsed (see [`record`]).
//!
//! ## Mapping
//!
//! Most users will want to use a [`Mapper`], which is constructed with a
//! [`mapper::Builder`] and maps one [`mapper::Unit`] (a protein, its gene and
//! one of its transcripts) at a time. Interfaces are thresholded on sequence
//! identity and variants are filtered on transcript, consequence and
//! identifier (see [`filter`]), after which each variant is joined with every
//! interface whose residue range contains its protein position (see
//! [`join`]). The results are appended to output files named after the
//! filter parameters (see [`output`]).
//!
//! ```
//! use pdbmapper::mapper::Builder;
//! use pdbmapper::mapper::Unit;
//!
//! let dir = tempdir::TempDir::new("pdbmapper")?;
//! std::fs::write(
//!     dir.path().join("interfaces.txt"),
//!     "Protein_accession,Structure_feature_id,Protein_start_position,Protein_end_position,Pident\n\
//!      ENSP01,F1,100,110,90\n",
//! )?;
//! std::fs::write(
//!     dir.path().join("variants.vep"),
//!     "#Uploaded_variation\tGene\tFeature\tConsequence\tProtein_position\n\
//!      V1\tENSG01\tENST01\tmissense_variant\t105\n",
//! )?;
//!
//! let mapper = Builder::default()
//!     .interface_store(dir.path().join("interfaces.txt"))?
//!     .variant_store(dir.path().join("variants.vep"))?
//!     .out_dir(dir.path())?
//!     .pident(50)?
//!     .try_build()?;
//!
//! let mapping = mapper.run(&Unit::new("ENSP01", "ENSG01", "ENST01"), false)?;
//! assert_eq!(mapping.set_ids().rows()[0].to_strings(), vec!["F1", "V1"]);
//!
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Splitting stores
//!
//! Large combined files can be split into a store with one file per
//! identifier using [`store::split::Splitter`], so that each unit only reads
//! the lines it needs.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![warn(rust_2021_compatibility)]
#![warn(missing_debug_implementations)]
#![warn(clippy::missing_docs_in_private_items)]
#![warn(rustdoc::broken_intra_doc_links)]

pub mod crossref;
pub mod expand;
pub mod filter;
pub mod join;
pub mod mapper;
pub mod output;
pub mod record;
pub mod resolve;
pub mod store;
pub mod table;

pub use mapper::Mapper;
pub use store::Store;
pub use table::Table;
