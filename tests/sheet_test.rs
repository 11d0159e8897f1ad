//! Integration tests for sheet layout and rendering
//!
//! These tests build small in-memory photos with known colors and check the
//! layout numbers, slot order, guides and rendered pixels end to end.

use image::{Rgba, RgbaImage};
use photo_sheet::{
    Color, Exporter, GuideMode, GuideSegment, ImageDecoder, LayoutConfig, LayoutGrid, PaperSpec,
    PhotoEntry, PhotoSpec, PngExporter, RasterDecoder, RenderOptions, SheetConfig, SheetError,
    SheetJob, SourceImage, UnitConverter, allocate_slots, render_sheet,
};
use std::sync::Arc;
use std::thread;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const RED: Rgba<u8> = Rgba([220, 20, 20, 255]);
const GREEN: Rgba<u8> = Rgba([20, 200, 20, 255]);

// Helper to create a photo filled with one color
fn solid_photo(name: &str, width: u32, height: u32, color: Rgba<u8>) -> Arc<SourceImage> {
    Arc::new(SourceImage::from_rgba(
        name,
        RgbaImage::from_pixel(width, height, color),
    ))
}

// Helper to create a photo whose left half is red and right half green
fn split_photo(width: u32, height: u32) -> Arc<SourceImage> {
    let img = RgbaImage::from_fn(width, height, |x, _| if x < width / 2 { RED } else { GREEN });
    Arc::new(SourceImage::from_rgba("split", img))
}

// 10 px per mm makes pixel positions easy to reason about
fn options_254() -> RenderOptions {
    RenderOptions {
        dpi: 254.0,
        ..RenderOptions::default()
    }
}

fn small_sheet(mode: GuideMode) -> LayoutConfig {
    LayoutConfig {
        paper: PaperSpec::new(50.0, 60.0),
        photo: PhotoSpec::new(20.0, 25.0),
        margin_mm: 5.0,
        gutter_mm: 0.0,
        guide_mode: mode,
        ..LayoutConfig::default()
    }
}

// ============================================================================
// Layout and allocation
// ============================================================================

#[test]
fn test_a4_passport_scenario() {
    let config = LayoutConfig {
        paper: "A4".parse().unwrap(),
        photo: "3x4".parse().unwrap(),
        margin_mm: 5.0,
        gutter_mm: 0.0,
        ..LayoutConfig::default()
    };
    let photo = solid_photo("a", 30, 40, RED);
    let job = SheetJob::new(&config, &[PhotoEntry::new(photo, 50)], RenderOptions::default());

    let summary = job.summary();
    assert_eq!((summary.cols, summary.rows, summary.capacity), (6, 7, 42));
    assert_eq!(summary.total_requested, 50);
    assert!(summary.would_truncate);
    assert_eq!(job.slots().len(), 42);
    assert!(job.slots().slots().iter().all(|s| *s == Some(0)));
}

#[test]
fn test_capacity_formula_over_many_configs() {
    for paper in [(210.0, 297.0), (148.0, 210.0), (215.9, 279.4), (100.0, 60.0)] {
        for photo in [(20.0, 30.0), (35.0, 45.0), (40.0, 60.0)] {
            for margin in [0.0, 5.0, 12.5] {
                for gutter in [0.0, 1.0, 3.5] {
                    let config = LayoutConfig {
                        paper: PaperSpec::new(paper.0, paper.1),
                        photo: PhotoSpec::new(photo.0, photo.1),
                        margin_mm: margin,
                        gutter_mm: gutter,
                        ..LayoutConfig::default()
                    };
                    let grid = LayoutGrid::compute(&config);
                    let expect = |p: f64, s: f64| {
                        let available = p - 2.0 * margin;
                        if available <= 0.0 {
                            0
                        } else {
                            ((available + gutter) / (s + gutter)).floor() as usize
                        }
                    };
                    assert_eq!(grid.cols, expect(paper.0, photo.0));
                    assert_eq!(grid.rows, expect(paper.1, photo.1));
                    assert_eq!(grid.capacity, grid.cols.saturating_mul(grid.rows));
                }
            }
        }
    }
}

#[test]
fn test_allocation_length_is_min_of_capacity_and_requested() {
    let a = solid_photo("a", 4, 4, RED);
    let b = solid_photo("b", 4, 4, GREEN);
    for capacity in 0..12 {
        for (ca, cb) in [(1, 1), (3, 2), (5, 5), (0, 7)] {
            let entries = vec![PhotoEntry::new(a.clone(), ca), PhotoEntry::new(b.clone(), cb)];
            let slots = allocate_slots(&entries, capacity);
            let requested = entries.iter().map(|e| e.count()).sum::<usize>();
            assert_eq!(slots.len(), capacity.min(requested));
            // entries are never interleaved
            let first_b = slots.slots().iter().position(|s| *s == Some(1));
            if let Some(first_b) = first_b {
                assert!(slots.slots()[first_b..].iter().all(|s| *s == Some(1)));
            }
        }
    }
}

#[test]
fn test_two_entries_truncated_in_order() {
    let entries = vec![
        PhotoEntry::new(solid_photo("a", 4, 4, RED), 3),
        PhotoEntry::new(solid_photo("b", 4, 4, GREEN), 2),
    ];
    let slots = allocate_slots(&entries, 4);
    assert_eq!(slots.slots(), &[Some(0), Some(0), Some(0), Some(1)]);
}

#[test]
fn test_invalid_dimensions_give_zero_capacity() {
    let config = LayoutConfig {
        paper: PaperSpec::new(-210.0, 297.0),
        ..LayoutConfig::default()
    };
    let job = SheetJob::new(
        &config,
        &[PhotoEntry::new(solid_photo("a", 4, 4, RED), 3)],
        options_254(),
    );
    assert_eq!(job.summary().capacity, 0);
    assert!(job.slots().is_empty());
    // Rendering still succeeds with an empty sheet
    let target = job.render().unwrap();
    assert_eq!(target.width(), 0);
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn test_render_dimensions_match_paper() {
    for (paper, dpi) in [("A4", 300.0), ("A6", 150.0), ("Letter", 72.0), ("A5", 96.0)] {
        let config = LayoutConfig {
            paper: paper.parse().unwrap(),
            ..LayoutConfig::default()
        };
        let options = RenderOptions {
            dpi,
            ..RenderOptions::default()
        };
        let target = render_sheet(&config, &[], options).unwrap();
        let expected_w = (config.paper.width_mm * dpi / 25.4).round() as u32;
        let expected_h = (config.paper.height_mm * dpi / 25.4).round() as u32;
        assert_eq!((target.width(), target.height()), (expected_w, expected_h));
        assert_eq!(target.paper(), config.paper);
    }
}

#[test]
fn test_center_crop_keeps_middle_of_wide_photo() {
    // A 4:1 photo cropped into a 20x25 slot keeps only the middle, which
    // straddles the red/green split.
    let config = small_sheet(GuideMode::None);
    let entries = vec![PhotoEntry::new(split_photo(400, 100), 1)];
    let target = render_sheet(&config, &entries, options_254()).unwrap();
    let img = target.image();
    // slot 0 spans x 50..250, y 50..300
    assert_eq!(*img.get_pixel(60, 100), RED);
    assert_eq!(*img.get_pixel(240, 100), GREEN);
    assert_eq!(*img.get_pixel(49, 100), WHITE);
}

#[test]
fn test_adjacent_slots_have_no_seam() {
    let config = small_sheet(GuideMode::None);
    let entries = vec![PhotoEntry::new(solid_photo("a", 8, 10, RED), 4)];
    let target = render_sheet(&config, &entries, options_254()).unwrap();
    let img = target.image();
    // cols meet at x = 250, rows at y = 300
    for x in 50..450 {
        assert_eq!(*img.get_pixel(x, 300), RED, "seam at x = {}", x);
    }
    for y in 50..550 {
        assert_eq!(*img.get_pixel(250, y), RED, "seam at y = {}", y);
    }
}

#[test]
fn test_cutter_ticks_sit_outside_the_block() {
    let config = small_sheet(GuideMode::Cutter);
    let entries = vec![PhotoEntry::new(solid_photo("a", 8, 10, RED), 4)];
    let target = render_sheet(&config, &entries, options_254()).unwrap();
    let img = target.image();
    let black = Rgba([0, 0, 0, 255]);

    // tick continuing the top edge to the left of the block
    assert_eq!(*img.get_pixel(20, 50), black);
    // tick continuing the internal vertical cut above the block
    assert_eq!(*img.get_pixel(250, 20), black);
    // internal cross and internal edges stay photo
    assert_eq!(*img.get_pixel(250, 300), RED);
    assert_eq!(*img.get_pixel(250, 150), RED);
    assert_eq!(*img.get_pixel(150, 300), RED);
}

#[test]
fn test_cutter_ticks_at_corner_of_partial_last_row() {
    // 2x2 grid of 30x40 slots at the paper origin, last slot left empty
    let config = LayoutConfig {
        paper: PaperSpec::new(60.0, 80.0),
        photo: PhotoSpec::new(30.0, 40.0),
        margin_mm: 0.0,
        gutter_mm: 0.0,
        guide_mode: GuideMode::Cutter,
        ..LayoutConfig::default()
    };
    let entries = vec![PhotoEntry::new(solid_photo("a", 3, 4, RED), 3)];
    let job = SheetJob::new(&config, &entries, options_254());
    assert_eq!(job.slots().slots(), &[Some(0), Some(0), Some(0)]);

    let guides = job.guides();
    assert_eq!(guides.segments.len(), 16);

    // the cuts bounding the empty cell continue into it from the inner corner
    let mut at_corner: Vec<GuideSegment> = guides
        .segments
        .iter()
        .copied()
        .filter(|s| (s.x1, s.y1) == (30.0, 40.0))
        .collect();
    at_corner.sort_by(|a, b| a.x2.total_cmp(&b.x2));
    assert_eq!(
        at_corner,
        vec![
            GuideSegment::new(30.0, 40.0, 30.0, 45.0),
            GuideSegment::new(30.0, 40.0, 35.0, 40.0),
        ]
    );
    assert!(
        guides
            .segments
            .iter()
            .all(|s| (s.x2, s.y2) != (25.0, 40.0) && (s.x2, s.y2) != (30.0, 35.0))
    );

    // drawn at 10 px per mm: both ticks show inside the empty cell only
    let target = job.render().unwrap();
    let img = target.image();
    let black = Rgba([0, 0, 0, 255]);
    assert_eq!(*img.get_pixel(300, 430), black);
    assert_eq!(*img.get_pixel(330, 400), black);
    assert_eq!(*img.get_pixel(300, 470), WHITE);
    assert_eq!(*img.get_pixel(370, 400), WHITE);
    assert_eq!(*img.get_pixel(450, 600), WHITE);
    assert_eq!(*img.get_pixel(250, 380), RED);
}

#[test]
fn test_guides_drawn_above_borders() {
    let config = LayoutConfig {
        border_mm: 2.0,
        border_color: Color::rgb(0, 0, 255),
        ..small_sheet(GuideMode::Cutter)
    };
    let entries = vec![PhotoEntry::new(solid_photo("a", 8, 10, RED), 1)];
    let target = render_sheet(&config, &entries, options_254()).unwrap();
    // the top-left horizontal tick runs through the border area
    assert_eq!(*target.image().get_pixel(40, 50), Rgba([0, 0, 0, 255]));
    // border away from the tick
    assert_eq!(*target.image().get_pixel(40, 100), Rgba([0, 0, 255, 255]));
}

#[test]
fn test_unreadable_photo_does_not_abort_sheet() {
    let config = small_sheet(GuideMode::None);
    let entries = vec![
        PhotoEntry::new(Arc::new(SourceImage::unreadable("missing.jpg", 300, 400)), 1),
        PhotoEntry::new(solid_photo("ok", 8, 10, GREEN), 1),
    ];
    let target = render_sheet(&config, &entries, options_254()).unwrap();
    assert_eq!(*target.image().get_pixel(100, 100), Rgba([0xf3, 0xf4, 0xf6, 255]));
    assert_eq!(*target.image().get_pixel(300, 100), GREEN);
}

#[test]
fn test_render_is_deterministic() {
    let config = LayoutConfig {
        border_mm: 0.5,
        ..small_sheet(GuideMode::Scissor)
    };
    let entries = vec![
        PhotoEntry::new(split_photo(123, 77), 2),
        PhotoEntry::new(solid_photo("g", 5, 9, GREEN), 1),
    ];
    let first = render_sheet(&config, &entries, options_254()).unwrap();
    let second = render_sheet(&config, &entries, options_254()).unwrap();
    assert_eq!(first.image().as_raw(), second.image().as_raw());
}

#[test]
fn test_concurrent_renders_are_independent() {
    let entries = vec![PhotoEntry::new(split_photo(64, 48), 3)];
    let job = Arc::new(SheetJob::new(
        &small_sheet(GuideMode::Cutter),
        &entries,
        options_254(),
    ));
    let other = Arc::new(SheetJob::new(
        &small_sheet(GuideMode::Scissor),
        &entries,
        options_254(),
    ));

    let handles: Vec<_> = [job.clone(), other.clone(), job.clone()]
        .into_iter()
        .map(|j| thread::spawn(move || j.render().unwrap().into_image()))
        .collect();
    let images: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(images[0].as_raw(), images[2].as_raw());
    assert_ne!(images[0].as_raw(), images[1].as_raw());
    assert_eq!(images[1].as_raw(), other.render().unwrap().image().as_raw());
}

#[test]
fn test_huge_dpi_reports_allocation_failure() {
    let options = RenderOptions {
        dpi: 1.0e9,
        ..RenderOptions::default()
    };
    let result = render_sheet(&LayoutConfig::default(), &[], options);
    assert!(matches!(result, Err(SheetError::SurfaceAllocation { .. })));
}

// ============================================================================
// Collaborators and configuration
// ============================================================================

#[test]
fn test_png_export_decodes_back() {
    let config = small_sheet(GuideMode::Cutter);
    let entries = vec![PhotoEntry::new(solid_photo("a", 8, 10, RED), 2)];
    let target = render_sheet(&config, &entries, options_254()).unwrap();
    let bytes = PngExporter.export(&target).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sheet.png");
    std::fs::write(&path, &bytes).unwrap();

    let decoded = RasterDecoder.decode_file(&path).unwrap();
    assert_eq!(decoded.dimensions(), (target.width(), target.height()));
    let again = RasterDecoder.decode("sheet.png", &bytes).unwrap();
    assert_eq!(again.pixels().unwrap().as_raw(), target.image().as_raw());
}

#[test]
fn test_sheet_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sheet.json");
    std::fs::write(
        &path,
        r##"{"paper": "A6", "photo": "3.5x4.5", "margin_mm": 3, "gutter_mm": 2,
            "border_mm": 1, "border_color": "#eeeeee", "guides": "scissor", "dpi": 600}"##,
    )
    .unwrap();

    let config = SheetConfig::load(&path).unwrap();
    let layout = config.layout_config().unwrap();
    assert_eq!(layout.paper, PaperSpec::new(105.0, 148.0));
    assert_eq!(layout.photo, PhotoSpec::new(35.0, 45.0));
    assert_eq!(layout.guide_mode, GuideMode::Scissor);
    assert_eq!(layout.border_color, Color::rgb(0xee, 0xee, 0xee));

    // (99 + 2) / 37 = 2.7, (142 + 2) / 47 = 3.06
    let grid = LayoutGrid::compute(&layout);
    assert_eq!((grid.cols, grid.rows), (2, 3));

    let conv = UnitConverter::new(config.dpi).unwrap();
    assert_eq!(conv.mm_to_px_len(layout.paper.width_mm), 2480);
}

#[test]
fn test_missing_config_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = SheetConfig::load(&dir.path().join("nope.json"));
    assert!(matches!(result, Err(SheetError::Io(_))));
}
