use mosse::{
    DirectDft, DumpSink, ImageView, MosseError, MosseResult, Region, TextSink, Tracker,
    TrackerConfig,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const PAD: usize = 24;

/// Blurred random texture, large enough to crop shifted frames from.
fn make_base(width: usize, height: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise: Vec<u8> = (0..width * height).map(|_| rng.random::<u8>()).collect();
    let mut out = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width {
            let mut sum = 0u32;
            let mut n = 0u32;
            for yy in y.saturating_sub(1)..=(y + 1).min(height - 1) {
                for xx in x.saturating_sub(1)..=(x + 1).min(width - 1) {
                    sum += noise[yy * width + xx] as u32;
                    n += 1;
                }
            }
            out[y * width + x] = (sum / n) as u8;
        }
    }
    out
}

/// Frame whose content is the base moved by `(dx, dy)`.
fn shifted_frame(
    base: &[u8],
    base_width: usize,
    width: usize,
    height: usize,
    dx: isize,
    dy: isize,
) -> Vec<u8> {
    let mut frame = Vec::with_capacity(width * height);
    for y in 0..height {
        let sy = (y as isize + PAD as isize - dy) as usize;
        for x in 0..width {
            let sx = (x as isize + PAD as isize - dx) as usize;
            frame.push(base[sy * base_width + sx]);
        }
    }
    frame
}

struct Scene {
    base: Vec<u8>,
    base_width: usize,
    width: usize,
    height: usize,
}

impl Scene {
    fn new(width: usize, height: usize, seed: u64) -> Self {
        let base_width = width + 2 * PAD;
        let base_height = height + 2 * PAD;
        Self {
            base: make_base(base_width, base_height, seed),
            base_width,
            width,
            height,
        }
    }

    fn frame(&self, dx: isize, dy: isize) -> Vec<u8> {
        shifted_frame(&self.base, self.base_width, self.width, self.height, dx, dy)
    }

    fn view<'a>(&self, frame: &'a [u8]) -> ImageView<'a, u8> {
        ImageView::from_slice(frame, self.width, self.height).unwrap()
    }
}

#[test]
fn stationary_target_keeps_region() {
    let scene = Scene::new(160, 160, 1);
    let frame = scene.frame(0, 0);
    let region = Region::new(40, 36, 64, 64);

    let mut tracker: Tracker = Tracker::new(TrackerConfig::default()).unwrap();
    tracker.init(scene.view(&frame), region).unwrap();
    let report = tracker.update_with_report(scene.view(&frame), 0.125).unwrap();

    assert_eq!(report.region, region);
    assert_eq!((report.dx, report.dy), (0, 0));
    assert!(report.subpixel_dx.abs() < 0.1 && report.subpixel_dy.abs() < 0.1);
    assert!(report.psr > 20.0, "psr {}", report.psr);
    assert!(!report.near_boundary);
    assert_eq!(tracker.region(), Some(region));
    assert_eq!(tracker.last_report(), Some(&report));
}

#[test]
fn smallest_accepted_regions_hold_still() {
    let scene = Scene::new(64, 64, 21);
    let frame = scene.frame(0, 0);
    let min = TrackerConfig::default().min_region_size;

    for (w, h) in [(min, min), (min, min + 7), (min + 7, min)] {
        let region = Region::new(20, 18, w, h);
        let mut tracker: Tracker = Tracker::default();
        tracker.init(scene.view(&frame), region).unwrap();
        let report = tracker
            .update_with_report(scene.view(&frame), 0.125)
            .unwrap_or_else(|e| panic!("{w}x{h}: {e}"));
        assert_eq!(report.region, region, "{w}x{h}");
        assert_eq!((report.dx, report.dy), (0, 0), "{w}x{h}");
    }
}

#[test]
fn known_translation_is_recovered_for_mid_sized_rectangle() {
    let scene = Scene::new(96, 96, 22);
    let first = scene.frame(0, 0);
    let second = scene.frame(3, -2);
    let region = Region::new(30, 24, 33, 47);

    let mut tracker: Tracker = Tracker::default();
    tracker.init(scene.view(&first), region).unwrap();
    let moved = tracker.update_default(scene.view(&second)).unwrap();

    assert_eq!(moved, Region::new(33, 22, 33, 47));
}

#[test]
fn out_of_range_perturbation_scale_is_refused() {
    let config = TrackerConfig {
        init_perturbations: 1,
        perturbation_scale: 1e308,
        ..TrackerConfig::default()
    };
    let err = Tracker::<DirectDft>::new(config).err();
    assert!(matches!(err, Some(MosseError::InvalidConfig(_))));
}

#[test]
fn known_translation_is_recovered() {
    let scene = Scene::new(160, 160, 2);
    let first = scene.frame(0, 0);
    let second = scene.frame(3, -2);
    let region = Region::new(32, 32, 96, 96);

    let mut tracker: Tracker = Tracker::default();
    tracker.init(scene.view(&first), region).unwrap();
    let moved = tracker.update_default(scene.view(&second)).unwrap();

    assert_eq!(moved, Region::new(35, 30, 96, 96));
    assert_eq!(tracker.region(), Some(moved));
}

#[test]
fn drifting_target_is_followed_over_several_frames() {
    let scene = Scene::new(160, 160, 3);
    let region = Region::new(32, 32, 96, 96);
    let first = scene.frame(0, 0);

    let mut tracker: Tracker = Tracker::default();
    tracker.init(scene.view(&first), region).unwrap();
    for step in 1..=4isize {
        let frame = scene.frame(2 * step, step);
        let moved = tracker.update_default(scene.view(&frame)).unwrap();
        let expected = Region::new(32 + 2 * step as usize, 32 + step as usize, 96, 96);
        assert_eq!(moved, expected, "step {step}");
    }
}

#[test]
fn perturbation_training_recovers_translation() {
    let scene = Scene::new(128, 128, 4);
    let first = scene.frame(0, 0);
    let second = scene.frame(-2, 1);
    let region = Region::new(32, 32, 64, 64);
    let config = TrackerConfig {
        init_perturbations: 8,
        perturbation_scale: 0.05,
        perturbation_seed: 11,
        ..TrackerConfig::default()
    };

    let mut tracker: Tracker = Tracker::new(config).unwrap();
    tracker.init(scene.view(&first), region).unwrap();
    let moved = tracker.update_default(scene.view(&second)).unwrap();
    assert_eq!(moved, Region::new(30, 33, 64, 64));
}

#[test]
fn perturbation_training_is_seeded() {
    let scene = Scene::new(96, 96, 5);
    let frame = scene.frame(0, 0);
    let region = Region::new(16, 16, 48, 48);
    let config = TrackerConfig {
        init_perturbations: 4,
        perturbation_seed: 7,
        ..TrackerConfig::default()
    };

    let mut a: Tracker = Tracker::new(config.clone()).unwrap();
    let mut b: Tracker = Tracker::new(config).unwrap();
    let mut plain: Tracker = Tracker::default();
    a.init(scene.view(&frame), region).unwrap();
    b.init(scene.view(&frame), region).unwrap();
    plain.init(scene.view(&frame), region).unwrap();

    assert_eq!(a.filter(), b.filter());
    assert_ne!(a.filter(), plain.filter());
}

#[test]
fn update_before_init_is_rejected() {
    let scene = Scene::new(64, 64, 6);
    let frame = scene.frame(0, 0);
    let mut tracker: Tracker = Tracker::default();

    assert!(!tracker.is_initialized());
    let err = tracker.update_default(scene.view(&frame)).unwrap_err();
    assert_eq!(err, MosseError::NotInitialized);
    assert!(!err.is_recoverable());
}

#[test]
fn invalid_region_leaves_tracker_uninitialized() {
    let scene = Scene::new(64, 64, 7);
    let frame = scene.frame(0, 0);
    let mut tracker: Tracker = Tracker::default();

    for region in [Region::new(40, 40, 32, 32), Region::new(0, 0, 0, 8)] {
        let err = tracker.init(scene.view(&frame), region).unwrap_err();
        assert!(matches!(err, MosseError::InvalidRegion { .. }), "{region:?}");
        assert!(!tracker.is_initialized());
    }

    let err = tracker.update_default(scene.view(&frame)).unwrap_err();
    assert_eq!(err, MosseError::NotInitialized);
}

#[test]
fn unrelated_frame_reports_tracking_lost_without_mutation() {
    let scene = Scene::new(128, 128, 8);
    let frame = scene.frame(0, 0);
    let region = Region::new(32, 32, 64, 64);

    let mut tracker: Tracker = Tracker::default();
    tracker.init(scene.view(&frame), region).unwrap();
    let filter_before = tracker.filter().cloned();

    let mut rng = StdRng::seed_from_u64(99);
    let noise: Vec<u8> = (0..128 * 128).map(|_| rng.random::<u8>()).collect();
    let err = tracker
        .update_default(ImageView::from_slice(&noise, 128, 128).unwrap())
        .unwrap_err();

    assert!(matches!(err, MosseError::TrackingLost { .. }), "{err:?}");
    assert!(err.is_recoverable());
    assert_eq!(tracker.region(), Some(region));
    assert_eq!(tracker.filter().cloned(), filter_before);
    assert!(tracker.last_report().is_none());
}

#[test]
fn blank_frame_reports_tracking_lost() {
    let scene = Scene::new(96, 96, 9);
    let frame = scene.frame(0, 0);
    let region = Region::new(16, 16, 48, 48);

    let mut tracker: Tracker = Tracker::default();
    tracker.init(scene.view(&frame), region).unwrap();
    let blank = vec![0u8; 96 * 96];
    let err = tracker
        .update_default(ImageView::from_slice(&blank, 96, 96).unwrap())
        .unwrap_err();
    assert!(matches!(err, MosseError::TrackingLost { .. }));
    assert_eq!(tracker.region(), Some(region));
}

#[test]
fn frame_too_small_is_a_mismatch() {
    let scene = Scene::new(96, 96, 10);
    let frame = scene.frame(0, 0);
    let region = Region::new(40, 40, 48, 48);

    let mut tracker: Tracker = Tracker::default();
    tracker.init(scene.view(&frame), region).unwrap();
    let small = vec![0u8; 64 * 64];
    let err = tracker
        .update_default(ImageView::from_slice(&small, 64, 64).unwrap())
        .unwrap_err();
    assert_eq!(
        err,
        MosseError::FrameMismatch {
            region,
            frame_width: 64,
            frame_height: 64,
        }
    );
    assert!(err.is_recoverable());
    assert_eq!(tracker.region(), Some(region));
}

#[test]
fn movement_past_the_frame_edge_is_clamped() {
    let scene = Scene::new(160, 160, 11);
    let first = scene.frame(0, 0);
    let second = scene.frame(5, 0);
    let region = Region::new(62, 32, 96, 96);

    let mut tracker: Tracker = Tracker::default();
    tracker.init(scene.view(&first), region).unwrap();
    let report = tracker
        .update_with_report(scene.view(&second), 0.125)
        .unwrap();

    assert_eq!(report.dx, 5);
    assert!(report.near_boundary);
    assert_eq!(report.region, Region::new(64, 32, 96, 96));
}

#[test]
fn zero_learning_rate_freezes_the_filter() {
    let scene = Scene::new(160, 160, 12);
    let first = scene.frame(0, 0);
    let second = scene.frame(1, 2);
    let region = Region::new(32, 32, 96, 96);

    let mut tracker: Tracker = Tracker::default();
    tracker.init(scene.view(&first), region).unwrap();
    let before = tracker.filter().cloned();
    let moved = tracker.update(scene.view(&second), 0.0).unwrap();
    assert_eq!(moved, Region::new(33, 34, 96, 96));
    assert_eq!(tracker.filter().cloned(), before);

    tracker.update(scene.view(&second), 0.5).unwrap();
    assert_ne!(tracker.filter().cloned(), before);
}

#[test]
fn direct_engine_tracks_like_fft() {
    let scene = Scene::new(96, 96, 13);
    let first = scene.frame(0, 0);
    let second = scene.frame(2, 1);
    let region = Region::new(24, 24, 48, 48);

    let mut fft: Tracker = Tracker::default();
    let mut direct: Tracker<DirectDft> = Tracker::default();
    fft.init(scene.view(&first), region).unwrap();
    direct.init(scene.view(&first), region).unwrap();

    let a = fft.update_with_report(scene.view(&second), 0.125).unwrap();
    let b = direct.update_with_report(scene.view(&second), 0.125).unwrap();
    assert_eq!(a.region, b.region);
    assert!((a.psr - b.psr).abs() < 1e-6);
}

#[test]
fn reset_returns_to_uninitialized() {
    let scene = Scene::new(64, 64, 14);
    let frame = scene.frame(0, 0);
    let mut tracker: Tracker = Tracker::default();
    tracker.init(scene.view(&frame), Region::new(8, 8, 32, 32)).unwrap();
    tracker.reset();
    assert!(!tracker.is_initialized());
    assert_eq!(tracker.region(), None);
    assert!(tracker.response().is_none());
}

#[test]
fn wider_pixel_types_are_accepted() {
    let scene = Scene::new(96, 96, 15);
    let frame: Vec<f32> = scene.frame(0, 0).iter().map(|&v| v as f32 / 255.0).collect();
    let view = ImageView::from_slice(&frame, 96, 96).unwrap();
    let region = Region::new(16, 16, 48, 48);

    let mut tracker: Tracker = Tracker::default();
    tracker.init(view, region).unwrap();
    assert_eq!(tracker.update_default(view).unwrap(), region);
}

#[derive(Default)]
struct Recorder {
    names: Vec<(String, usize, usize, usize)>,
    finished: usize,
}

impl DumpSink for Recorder {
    fn write_matrix(
        &mut self,
        name: &str,
        data: &[f64],
        width: usize,
        height: usize,
    ) -> MosseResult<()> {
        self.names.push((name.to_string(), data.len(), width, height));
        Ok(())
    }

    fn finish(&mut self) -> MosseResult<()> {
        self.finished += 1;
        Ok(())
    }
}

#[test]
fn dump_writes_every_matrix() {
    let scene = Scene::new(64, 64, 16);
    let frame = scene.frame(0, 0);
    let mut tracker: Tracker = Tracker::default();

    let mut recorder = Recorder::default();
    assert_eq!(
        tracker.dump(&mut recorder).unwrap_err(),
        MosseError::NotInitialized
    );

    tracker.init(scene.view(&frame), Region::new(8, 8, 24, 16)).unwrap();
    tracker.update_default(scene.view(&frame)).unwrap();
    tracker.dump(&mut recorder).unwrap();

    let names: Vec<&str> = recorder.names.iter().map(|(n, ..)| n.as_str()).collect();
    assert_eq!(
        names,
        ["window", "response", "filter_re", "filter_im", "filter_mag"]
    );
    assert!(recorder
        .names
        .iter()
        .all(|(_, len, w, h)| *len == 24 * 16 && *w == 24 && *h == 16));
    assert_eq!(recorder.finished, 1);
}

#[test]
fn text_dump_has_headers_and_rows() {
    let scene = Scene::new(48, 48, 17);
    let frame = scene.frame(0, 0);
    let config = TrackerConfig {
        min_region_size: 8,
        ..TrackerConfig::default()
    };
    let mut tracker: Tracker = Tracker::new(config).unwrap();
    tracker.init(scene.view(&frame), Region::new(8, 8, 16, 8)).unwrap();

    let mut sink = TextSink::new(Vec::new()).with_precision(3);
    tracker.dump(&mut sink).unwrap();
    let text = String::from_utf8(sink.into_inner()).unwrap();

    let headers: Vec<&str> = text.lines().filter(|l| l.starts_with('#')).collect();
    assert_eq!(headers[0], "# window 16 8");
    assert_eq!(headers.len(), 5);
    assert_eq!(text.lines().count(), 5 * (1 + 8));
    let first_row = text.lines().nth(1).unwrap();
    assert_eq!(first_row.split(' ').count(), 16);
}
