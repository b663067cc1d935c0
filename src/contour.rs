use image::{GrayImage, ImageBuffer, Luma};
use imageproc::contours::{find_contours, BorderType};
use imageproc::distance_transform::Norm;
use imageproc::morphology::{dilate, erode};
use kurbo::Point;
use log::debug;

use crate::band::intersect;
use crate::geom::closed_arc_length;
use crate::simplify::rdp;

/// Morphological gradient of a binary mask with a 3×3 square element:
/// dilation minus erosion, a rim roughly two pixels wide straddling the
/// boundary.
pub fn rim(mask: &GrayImage) -> GrayImage {
    let dilated = dilate(mask, Norm::LInf, 1);
    let eroded = erode(mask, Norm::LInf, 1);
    ImageBuffer::from_fn(mask.width(), mask.height(), |x, y| {
        Luma([dilated.get_pixel(x, y).0[0].saturating_sub(eroded.get_pixel(x, y).0[0])])
    })
}

/// Outermost contours of a binary image, every boundary pixel kept
/// (8-connected border following). Holes and anything nested inside a hole
/// are skipped.
pub fn external_contours(binary: &GrayImage) -> Vec<Vec<Point>> {
    find_contours::<i32>(binary)
        .into_iter()
        .filter(|contour| contour.border_type == BorderType::Outer && contour.parent.is_none())
        .map(|contour| {
            contour
                .points
                .iter()
                .map(|p| Point::new(p.x as f64, p.y as f64))
                .collect()
        })
        .collect()
}

/// The contour with the greatest closed perimeter. The first one found wins
/// a tie.
pub fn longest_contour(contours: &[Vec<Point>]) -> Option<&[Point]> {
    let mut best: Option<(&[Point], f64)> = None;
    for contour in contours {
        let length = closed_arc_length(contour);
        if best.map_or(true, |(_, best_len)| length > best_len) {
            best = Some((contour.as_slice(), length));
        }
    }
    best.map(|(contour, _)| contour)
}

/// Fuse gated edges with the mask rim, pick the dominant boundary and
/// simplify it.
///
/// Returns `(polyline, fused)`. The polyline is empty when the fused image
/// holds no contour; `fused` is kept for diagnostics.
pub fn fuse_and_polygonize(
    mask: &GrayImage,
    gated_edges: &GrayImage,
    epsilon: f64,
) -> (Vec<Point>, GrayImage) {
    let fused = intersect(gated_edges, &rim(mask));
    let contours = external_contours(&fused);

    let polyline = match longest_contour(&contours) {
        Some(raw) => {
            let simplified = rdp(raw, epsilon);
            debug!(
                "contour: {} candidates, longest {} px -> {} vertices",
                contours.len(),
                raw.len(),
                simplified.len()
            );
            simplified
        }
        None => {
            debug!("contour: no boundary in fused image");
            Vec::new()
        }
    };
    (polyline, fused)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::foreground_count;

    fn square_mask(size: u32, lo: u32, hi: u32) -> GrayImage {
        ImageBuffer::from_fn(size, size, |x, y| {
            if (lo..=hi).contains(&x) && (lo..=hi).contains(&y) {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        })
    }

    #[test]
    fn rim_straddles_boundary() {
        let mask = square_mask(20, 5, 14);
        let r = rim(&mask);
        // Just inside and just outside the edge, but not the interior.
        assert_eq!(r.get_pixel(5, 10).0[0], 255);
        assert_eq!(r.get_pixel(4, 10).0[0], 255);
        assert_eq!(r.get_pixel(10, 10).0[0], 0);
        assert_eq!(r.get_pixel(1, 1).0[0], 0);
    }

    #[test]
    fn empty_fused_image_yields_empty_polyline() {
        let mask = square_mask(20, 5, 14);
        let (poly, fused) = fuse_and_polygonize(&mask, &GrayImage::new(20, 20), 1.0);
        assert!(poly.is_empty());
        assert_eq!(foreground_count(&fused), 0);
    }

    #[test]
    fn square_rim_simplifies_to_corners() {
        let mask = square_mask(30, 8, 21);
        let all_edges = GrayImage::from_pixel(30, 30, Luma([255u8]));
        let (poly, _) = fuse_and_polygonize(&mask, &all_edges, 1.0);
        assert!(poly.len() >= 4 && poly.len() <= 6, "got {} vertices", poly.len());
        for p in &poly {
            assert!(p.x >= 7.0 && p.x <= 22.0 && p.y >= 7.0 && p.y <= 22.0);
        }
    }

    #[test]
    fn picks_the_longest_contour() {
        let small = vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 1.0)];
        let large = vec![Point::new(0.0, 0.0), Point::new(9.0, 0.0), Point::new(9.0, 9.0)];
        let contours = vec![small.clone(), large.clone(), small];
        assert_eq!(longest_contour(&contours), Some(large.as_slice()));
        assert_eq!(longest_contour(&[]), None);
    }

    #[test]
    fn tie_goes_to_first_found() {
        let a = vec![Point::new(0.0, 0.0), Point::new(4.0, 0.0)];
        let b = vec![Point::new(10.0, 10.0), Point::new(14.0, 10.0)];
        let contours = vec![a.clone(), b];
        assert_eq!(longest_contour(&contours), Some(a.as_slice()));
    }

    #[test]
    fn skips_contours_nested_in_holes() {
        // Ring with an island inside the hole.
        let img = ImageBuffer::from_fn(30, 30, |x, y| {
            let ring = (3..=26).contains(&x)
                && (3..=26).contains(&y)
                && !((6..=23).contains(&x) && (6..=23).contains(&y));
            let island = (12..=17).contains(&x) && (12..=17).contains(&y);
            if ring || island {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        });
        let contours = external_contours(&img);
        assert_eq!(contours.len(), 1);
        assert!(contours[0].iter().all(|p| p.x <= 26.0 && p.x >= 3.0));
        assert!(contours[0].iter().any(|p| p.x == 3.0));
    }
}
