use approx::assert_abs_diff_eq;
use coordinate_transformer::ViewerTransformer;
use pcd_core::{
    config::{CameraParams, DensifyParams, HagParams, ScaleFigureParams},
    LabeledPointSets, Placement, Point4D, PointSet, PointSetRole, SceneMetadata, SceneType,
    ViewerConfig,
};
use pcd_viewer::{
    alpha::{channels::intensity_alphas, combine_alphas},
    camera::plan_cliff_camera,
    densify::densify_ground,
    hag::height_above_ground,
    scale_figure::plan_boulder_figure,
    BatchRunner, Runner, SceneAssemblerBuilder, SceneInput,
};

fn p(x: f64, y: f64, z: f64) -> Point4D {
    Point4D::new(x, y, z, 100.0)
}

#[test]
fn densification_promotes_a_point_close_to_ground() {
    let params = DensifyParams {
        radius: 2.0,
        min_neighbors: 1,
        max_ground_hag: 0.5,
    };
    let result = densify_ground(
        &vec![p(0.0, 0.0, 0.0)].into(),
        &vec![p(0.1, 0.1, 0.2)].into(),
        &params,
    );
    assert!(result.raw.is_empty());
    assert_eq!(result.ground.len(), 2);
}

#[test]
fn height_above_flat_ground() {
    let ground: PointSet = vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)].into();
    let foliage: PointSet = vec![p(0.3, 0.3, 1.5)].into();
    let hags = height_above_ground(&foliage, &ground, &HagParams::default());
    assert_abs_diff_eq!(hags[0], 1.5);
}

#[test]
fn intensity_channel_ignores_unknown_values() {
    let alphas = intensity_alphas(&[-1.0, 10.0, 20.0, 30.0], 30.0, 0.4, 1.0);
    assert_eq!(alphas[0], 1.0);
    assert_abs_diff_eq!(alphas[1], 0.4);
    assert_abs_diff_eq!(alphas[3], 1.0);
}

#[test]
fn neutral_channels_stay_neutral() {
    let ones = [1.0; 8];
    let combined = combine_alphas(&[&ones[..], &ones[..], &ones[..], &ones[..]], 0.1).unwrap();
    assert!(combined.iter().all(|a| *a == 1.0));
}

#[test]
fn transform_round_trip() {
    let transformer = ViewerTransformer::new([300_000.0, 4_100_000.0, 250.0]).unwrap();
    let native = [300_012.5, 4_099_987.25, 262.0];
    let back = transformer.inverse(transformer.forward(native));
    for axis in 0..3 {
        assert_abs_diff_eq!(back[axis], native[axis], epsilon = 1e-9);
    }
}

fn cliff_sides() -> PointSet {
    (0..=30)
        .flat_map(|i| {
            (0..=8).map(move |k| {
                let y = if (i + k) % 2 == 0 { 0.2 } else { -0.2 };
                p(i as f64, y, 50.0 + k as f64)
            })
        })
        .collect()
}

fn cliff_ground() -> PointSet {
    let low = (0..=30).map(|i| p(i as f64, -6.0, 49.0));
    let high = (0..=30).map(|i| p(i as f64, 6.0, 58.0));
    low.chain(high).collect()
}

#[test]
fn camera_looks_from_the_lower_side() {
    let plan = plan_cliff_camera(&cliff_sides(), &cliff_ground(), &CameraParams::default()).unwrap();
    assert_abs_diff_eq!(plan.view_direction[1], -1.0, epsilon = 1e-6);
    assert!(plan.distance >= 15.0);
}

#[test]
fn boulder_figure_takes_the_elevation_of_the_nearest_ground() {
    let top: PointSet = (0..=4)
        .flat_map(|i| (0..=5).map(move |j| p(i as f64, j as f64, 2.0)))
        .collect();
    let ground: PointSet = vec![p(2.0, 6.0, 0.75), p(8.0, 0.0, 3.0), p(-5.0, -5.0, 9.0)].into();
    let plan =
        plan_boulder_figure(&top, &PointSet::default(), &ground, &ScaleFigureParams::default())
            .unwrap();
    assert_eq!(plan.native_base[2], 0.75);
}

#[test]
fn cliff_scene_end_to_end() {
    let foliage: PointSet = (0..40)
        .map(|i| {
            let t = i as f64;
            Point4D::new(t * 0.7 % 30.0, -3.0 - (t * 0.3) % 2.0, 49.0 + (t * 0.9) % 6.0, t * 5.0)
        })
        .collect();
    let sets = LabeledPointSets {
        sides: cliff_sides(),
        ground_context: cliff_ground(),
        foliage_context: foliage.clone(),
        ..LabeledPointSets::default()
    };
    let assembler = SceneAssemblerBuilder::new().build();
    let payload = assembler
        .assemble(&sets, [15.0, 0.0, 54.0], &SceneMetadata::new(SceneType::Cliff), true)
        .unwrap();

    let camera = payload.camera.placed().unwrap();
    assert!(camera.position[2] > 0.0);
    assert!(payload.scale_figure.is_placed());

    let ground_context = payload.record(PointSetRole::GroundContext).unwrap();
    let foliage_record = payload.record(PointSetRole::FoliageContext).map_or(0, |r| r.point_count());
    assert_eq!(
        ground_context.point_count() + foliage_record,
        cliff_ground().len() + foliage.len()
    );
    for record in &payload.records {
        assert_eq!(record.positions.len(), record.point_count() * 3);
        assert_eq!(record.colors.len(), record.point_count() * 4);
        assert!(record.alphas().all(|a| (0.0..=1.0).contains(&a)));
    }

    let json = serde_json::to_value(&payload).unwrap();
    assert_eq!(json["metadata"]["type"], "Cliff");
    assert_eq!(json["camera"]["status"], "placed");
    assert!(json["scale_figure"]["base"].is_array());
}

#[test]
fn batch_keeps_going_past_a_bad_scene() {
    let good = SceneInput {
        id: "good".into(),
        sets: LabeledPointSets {
            sides: cliff_sides(),
            ground: cliff_ground(),
            ..LabeledPointSets::default()
        },
        center: [15.0, 0.0, 54.0],
        metadata: SceneMetadata::new(SceneType::Cliff),
        include_scale_figure: false,
    };
    let mut bad = good.clone();
    bad.id = "bad".into();
    bad.center = [f64::NAN; 3];

    let config = ViewerConfig::default();
    let runner = BatchRunner::new(SceneAssemblerBuilder::new().config(config).without_planarity().build());
    let outputs = runner.execute(vec![bad, good]);

    assert!(outputs[0].result.is_err());
    let payload = outputs[1].result.as_ref().unwrap();
    assert!(payload.camera.is_placed());
    assert_eq!(payload.scale_figure, Placement::NotRequested);
}
