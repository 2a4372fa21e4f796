//! Heightmap to terrain mesh conversion.
//!
//! [`terrain::build_terrain`] turns a decoded grayscale image into a vertex
//! array (position, colour, normal) and a triangle-list index array ready for
//! upload.

pub mod terrain;
