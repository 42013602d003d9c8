//! Morphological operators
//!
//! ## Overview
//!
//! Dilation, erosion, opening and closing over a [`StructuringElement`],
//! with the binary/gray-scale rule chosen once per call through
//! [`MorphStyle`]:
//!
//! - **Binary**: samples must be exactly 0 or [`MAX_LEVEL`]. Dilation
//!   stamps the element's member cells (as [`MAX_LEVEL`]) around every
//!   foreground pixel; erosion keeps a foreground pixel only when every
//!   member cell lands in bounds on foreground.
//! - **Gray**: any single-channel samples. Dilation is the max of
//!   `value + weight`, erosion the min of `value - weight`, over the
//!   in-bounds cells of the full element grid.
//!
//! Both styles use the same target arithmetic `(i - origin_row + m,
//! j - origin_col + n)`; the element is not reflected for dilation.

use crate::error::{OpsError, OpsResult};
use dip_core::{Image, MAX_LEVEL};
use tracing::debug;

/// Element-wise rule selection for the morphological operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MorphStyle {
    /// 0-or-[`MAX_LEVEL`] set morphology.
    Binary,
    /// Additive-weight max/min morphology.
    Gray,
}

/// A weighted neighborhood grid with an explicit origin.
///
/// Cell values are additive weights for gray-scale morphology; any nonzero
/// cell counts as a member for binary morphology. The origin cell is forced
/// to membership at construction (set to [`MAX_LEVEL`] when zero), so the
/// identity target is always part of the neighborhood.
#[derive(Debug, Clone)]
pub struct StructuringElement {
    data: Vec<f32>,
    rows: usize,
    cols: usize,
    origin: (usize, usize),
}

impl StructuringElement {
    /// Build an element from row-major weights and an origin inside the grid.
    pub fn new(
        data: Vec<f32>,
        rows: usize,
        cols: usize,
        origin_row: usize,
        origin_col: usize,
    ) -> OpsResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(OpsError::InvalidParameter(
                "structuring element dimensions must be nonzero".to_string(),
            ));
        }
        if data.len() != rows * cols {
            return Err(OpsError::InvalidParameter(format!(
                "structuring element data length {} does not match {rows}x{cols}",
                data.len()
            )));
        }
        if origin_row >= rows || origin_col >= cols {
            return Err(OpsError::InvalidParameter(format!(
                "structuring element origin ({origin_row}, {origin_col}) outside {rows}x{cols} grid"
            )));
        }
        let mut data = data;
        let idx = origin_row * cols + origin_col;
        if data[idx] == 0.0 {
            data[idx] = MAX_LEVEL;
        }
        Ok(Self {
            data,
            rows,
            cols,
            origin: (origin_row, origin_col),
        })
    }

    /// Solid rectangle of members, origin at the center.
    pub fn rect(rows: usize, cols: usize) -> OpsResult<Self> {
        Self::new(vec![MAX_LEVEL; rows * cols], rows, cols, rows / 2, cols / 2)
    }

    /// Grid rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Grid columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Origin cell as `(row, col)`.
    pub fn origin(&self) -> (usize, usize) {
        self.origin
    }

    /// Weight at `(m, n)`.
    pub fn at(&self, m: usize, n: usize) -> f32 {
        self.data[m * self.cols + n]
    }

    /// Whether `(m, n)` belongs to the neighborhood.
    pub fn is_member(&self, m: usize, n: usize) -> bool {
        self.at(m, n) != 0.0
    }

    fn member_count(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0.0).count()
    }
}

fn check_binary(name: &str, img: &Image) -> OpsResult<()> {
    if !img.is_gray() {
        return Err(OpsError::Unsupported(format!(
            "{name}: single-channel images only, got {} channels",
            img.channels()
        )));
    }
    if img.data().iter().any(|&v| v != 0.0 && v != MAX_LEVEL) {
        return Err(OpsError::Unsupported(format!(
            "{name}: binary morphology requires samples of 0 or {MAX_LEVEL}"
        )));
    }
    Ok(())
}

fn check_gray(name: &str, img: &Image) -> OpsResult<()> {
    if !img.is_gray() {
        return Err(OpsError::Unsupported(format!(
            "{name}: single-channel images only, got {} channels",
            img.channels()
        )));
    }
    Ok(())
}

fn binary_dilate(src: &Image, se: &StructuringElement) -> OpsResult<Image> {
    let nr = src.rows();
    let nc = src.cols();
    let (orow, ocol) = se.origin;
    let mut out = Image::new(nr, nc, 1)?;
    for i in 0..nr {
        for j in 0..nc {
            if src.at(i, j, 0) == 0.0 {
                continue;
            }
            for m in 0..se.rows {
                for n in 0..se.cols {
                    if !se.is_member(m, n) {
                        continue;
                    }
                    let r = i as isize - orow as isize + m as isize;
                    let c = j as isize - ocol as isize + n as isize;
                    if r >= 0 && r < nr as isize && c >= 0 && c < nc as isize {
                        *out.at_mut(r as usize, c as usize, 0) = MAX_LEVEL;
                    }
                }
            }
        }
    }
    Ok(out)
}

fn binary_erode(src: &Image, se: &StructuringElement) -> OpsResult<Image> {
    let nr = src.rows();
    let nc = src.cols();
    let (orow, ocol) = se.origin;
    let members = se.member_count();
    let mut out = Image::new(nr, nc, 1)?;
    for i in 0..nr {
        for j in 0..nc {
            if src.at(i, j, 0) == 0.0 {
                continue;
            }
            let mut count = 0;
            for m in 0..se.rows {
                for n in 0..se.cols {
                    let r = i as isize - orow as isize + m as isize;
                    let c = j as isize - ocol as isize + n as isize;
                    if r >= 0
                        && r < nr as isize
                        && c >= 0
                        && c < nc as isize
                        && se.is_member(m, n)
                        && src.at(r as usize, c as usize, 0) != 0.0
                    {
                        count += 1;
                    }
                }
            }
            if count == members {
                *out.at_mut(i, j, 0) = MAX_LEVEL;
            }
        }
    }
    Ok(out)
}

fn gray_dilate(src: &Image, se: &StructuringElement) -> OpsResult<Image> {
    let nr = src.rows();
    let nc = src.cols();
    let (orow, ocol) = se.origin;
    let mut out = Image::new(nr, nc, 1)?;
    for i in 0..nr {
        for j in 0..nc {
            // the origin cell always lands on (i, j), so the fold is never empty
            let mut best = f32::MIN;
            for m in 0..se.rows {
                for n in 0..se.cols {
                    let r = i as isize - orow as isize + m as isize;
                    let c = j as isize - ocol as isize + n as isize;
                    if r >= 0 && r < nr as isize && c >= 0 && c < nc as isize {
                        best = best.max(src.at(r as usize, c as usize, 0) + se.at(m, n));
                    }
                }
            }
            *out.at_mut(i, j, 0) = best;
        }
    }
    Ok(out)
}

fn gray_erode(src: &Image, se: &StructuringElement) -> OpsResult<Image> {
    let nr = src.rows();
    let nc = src.cols();
    let (orow, ocol) = se.origin;
    let mut out = Image::new(nr, nc, 1)?;
    for i in 0..nr {
        for j in 0..nc {
            let mut worst = f32::MAX;
            for m in 0..se.rows {
                for n in 0..se.cols {
                    let r = i as isize - orow as isize + m as isize;
                    let c = j as isize - ocol as isize + n as isize;
                    if r >= 0 && r < nr as isize && c >= 0 && c < nc as isize {
                        worst = worst.min(src.at(r as usize, c as usize, 0) - se.at(m, n));
                    }
                }
            }
            *out.at_mut(i, j, 0) = worst;
        }
    }
    Ok(out)
}

/// Dilate `src` by the element under the chosen style.
pub fn dilate(src: &Image, se: &StructuringElement, style: MorphStyle) -> OpsResult<Image> {
    debug!(rows = src.rows(), cols = src.cols(), ?style, "dilate");
    match style {
        MorphStyle::Binary => {
            check_binary("dilate", src)?;
            binary_dilate(src, se)
        }
        MorphStyle::Gray => {
            check_gray("dilate", src)?;
            gray_dilate(src, se)
        }
    }
}

/// Erode `src` by the element under the chosen style.
pub fn erode(src: &Image, se: &StructuringElement, style: MorphStyle) -> OpsResult<Image> {
    debug!(rows = src.rows(), cols = src.cols(), ?style, "erode");
    match style {
        MorphStyle::Binary => {
            check_binary("erode", src)?;
            binary_erode(src, se)
        }
        MorphStyle::Gray => {
            check_gray("erode", src)?;
            gray_erode(src, se)
        }
    }
}

/// Erode then dilate; removes features smaller than the element.
pub fn open(src: &Image, se: &StructuringElement, style: MorphStyle) -> OpsResult<Image> {
    dilate(&erode(src, se, style)?, se, style)
}

/// Dilate then erode; fills gaps smaller than the element.
pub fn close(src: &Image, se: &StructuringElement, style: MorphStyle) -> OpsResult<Image> {
    erode(&dilate(src, se, style)?, se, style)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cross3() -> StructuringElement {
        let l = MAX_LEVEL;
        StructuringElement::new(
            vec![0.0, l, 0.0, l, l, l, 0.0, l, 0.0],
            3,
            3,
            1,
            1,
        )
        .unwrap()
    }

    #[test]
    fn test_se_validation() {
        assert!(StructuringElement::new(vec![1.0; 4], 2, 3, 0, 0).is_err());
        assert!(StructuringElement::new(vec![1.0; 6], 2, 3, 2, 0).is_err());
        assert!(StructuringElement::new(Vec::new(), 0, 0, 0, 0).is_err());
    }

    #[test]
    fn test_se_origin_forced_to_member() {
        let se = StructuringElement::new(vec![0.0; 9], 3, 3, 1, 1).unwrap();
        assert!(se.is_member(1, 1));
        assert_eq!(se.at(1, 1), MAX_LEVEL);
        assert!(!se.is_member(0, 0));
        assert_eq!(se.member_count(), 1);
    }

    #[test]
    fn test_binary_dilate_stamps_element() {
        let mut img = Image::new(7, 7, 1).unwrap();
        *img.at_mut(3, 3, 0) = MAX_LEVEL;
        let out = dilate(&img, &cross3(), MorphStyle::Binary).unwrap();
        for (i, j) in [(3, 3), (2, 3), (4, 3), (3, 2), (3, 4)] {
            assert_eq!(out.at(i, j, 0), MAX_LEVEL, "expected mark at ({i}, {j})");
        }
        assert_eq!(out.at(2, 2, 0), 0.0);
        assert_eq!(out.at(0, 0, 0), 0.0);
    }

    #[test]
    fn test_binary_erode_needs_full_support() {
        let mut img = Image::new(7, 7, 1).unwrap();
        for i in 2..5 {
            for j in 2..5 {
                *img.at_mut(i, j, 0) = MAX_LEVEL;
            }
        }
        let se = StructuringElement::rect(3, 3).unwrap();
        let out = erode(&img, &se, MorphStyle::Binary).unwrap();
        assert_eq!(out.at(3, 3, 0), MAX_LEVEL);
        for (i, j) in [(2, 2), (2, 3), (3, 2), (4, 4)] {
            assert_eq!(out.at(i, j, 0), 0.0);
        }
    }

    #[test]
    fn test_binary_open_removes_lone_point() {
        let mut img = Image::new(7, 7, 1).unwrap();
        *img.at_mut(2, 2, 0) = MAX_LEVEL;
        let se = StructuringElement::rect(3, 3).unwrap();
        let out = open(&img, &se, MorphStyle::Binary).unwrap();
        for i in 0..7 {
            for j in 0..7 {
                assert_eq!(out.at(i, j, 0), 0.0);
            }
        }
    }

    #[test]
    fn test_binary_rejects_gray_samples() {
        let img = Image::filled(4, 4, 1, 5.0).unwrap();
        let se = StructuringElement::rect(3, 3).unwrap();
        assert!(matches!(
            dilate(&img, &se, MorphStyle::Binary),
            Err(OpsError::Unsupported(_))
        ));
    }

    #[test]
    fn test_gray_dilate_and_erode_shift_by_weight() {
        let img = Image::filled(5, 5, 1, 10.0).unwrap();
        let se = StructuringElement::new(vec![2.0; 9], 3, 3, 1, 1).unwrap();
        let up = dilate(&img, &se, MorphStyle::Gray).unwrap();
        let down = erode(&img, &se, MorphStyle::Gray).unwrap();
        for i in 0..5 {
            for j in 0..5 {
                assert_eq!(up.at(i, j, 0), 12.0);
                assert_eq!(down.at(i, j, 0), 8.0);
            }
        }
    }

    #[test]
    fn test_gray_open_restores_constant() {
        let img = Image::filled(5, 5, 1, 10.0).unwrap();
        let se = StructuringElement::new(vec![2.0; 9], 3, 3, 1, 1).unwrap();
        let out = open(&img, &se, MorphStyle::Gray).unwrap();
        for i in 0..5 {
            for j in 0..5 {
                assert_eq!(out.at(i, j, 0), 10.0);
            }
        }
    }
}
