use approx::assert_relative_eq;
use imgops_core::prelude::*;
use imgops_stats::moments::{self, normalized_name, CENTROID};
use imgops_stats::stats::{MEAN, MIN_MAX, MOMENT4_ABOUT_MEAN, SIZE, SUM, SUM_OF_SQUARES};
use imgops_stats::{ReduceImage, Reduction};
use proptest::prelude::*;

fn service() -> OpService {
    let mut registry = OpRegistry::new();
    imgops_stats::register(&mut registry);
    OpService::new(registry).unwrap()
}

fn float(value: Value) -> f64 {
    value.as_float().expect("float result")
}

/// 5x4 byte image, `(7x + 3y) mod 11`
fn ramp() -> ImgHandle {
    let (w, h) = (5, 4);
    let data = (0..h)
        .flat_map(|y| (0..w).map(move |x| ((7 * x + 3 * y) % 11) as u8))
        .collect();
    ArrayImg::from_data(&[w, h], ImgData::UInt8(data))
        .unwrap()
        .into_handle()
}

#[test]
fn test_descriptive_statistics() -> anyhow::Result<()> {
    let ops = service();
    let img = ramp();
    assert_eq!(float(ops.run(SUM, &args![img.clone()])?), 106.0);
    assert_eq!(float(ops.run(SIZE, &args![img.clone()])?), 20.0);
    assert_eq!(float(ops.run(SUM_OF_SQUARES, &args![img.clone()])?), 758.0);
    assert_relative_eq!(float(ops.run(MEAN, &args![img.clone()])?), 5.3, epsilon = 1e-12);
    assert_relative_eq!(
        float(ops.run(MOMENT4_ABOUT_MEAN, &args![img])?),
        168.4617,
        epsilon = 1e-9
    );
    Ok(())
}

#[test]
fn test_min_max_returns_both_outputs() -> anyhow::Result<()> {
    let ops = service();
    let out = ops.run(MIN_MAX, &args![ramp()])?;
    assert_eq!(out, Value::List(vec![Value::Float(0.0), Value::Float(10.0)]));
    Ok(())
}

#[test]
fn test_blank_image_has_no_centroid() {
    let ops = service();
    let img = ArrayImg::new(&[3, 3], SampleType::Float32).unwrap();
    let err = ops.run(CENTROID, &args![img]).unwrap_err();
    assert!(matches!(err, Error::Execution { .. }));
}

#[test]
fn test_complex_image_has_no_match() {
    let ops = service();
    let img = ArrayImg::new(&[4], SampleType::ComplexFloat32).unwrap();
    assert!(ops.run(SUM, &args![img]).unwrap_err().is_no_match());
}

#[derive(Default)]
struct DoubledSum;

impl Reduction for DoubledSum {
    const NAME: &'static str = SUM;

    fn reduce(&self, img: &ArrayImg) -> imgops_core::Result<f64> {
        Ok(2.0 * img.real_values().sum::<f64>())
    }
}

#[test]
fn test_mean_builds_on_highest_ranked_sum() -> anyhow::Result<()> {
    let ops = service();
    let img = ramp();
    ops.register(
        OpDescriptor::builder::<ReduceImage<DoubledSum>>(SUM)
            .priority(priority::HIGH)
            .input("image", TypeDesc::img(TypeDesc::var("T", TypeDesc::real_sample())))
            .output("result", TypeDesc::float())
            .build(),
    );
    assert_eq!(float(ops.run(SUM, &args![img.clone()])?), 212.0);
    assert_relative_eq!(float(ops.run(MEAN, &args![img])?), 10.6, epsilon = 1e-12);
    Ok(())
}

#[test]
fn test_raw_moments() -> anyhow::Result<()> {
    let ops = service();
    let img = ramp();
    let moment = |p, q| ops.run(moments::raw_name(p, q), &args![img.clone()]).map(float);
    assert_eq!(moment(0, 0)?, 106.0);
    assert_eq!(moment(1, 0)?, 217.0);
    assert_eq!(moment(0, 1)?, 157.0);
    assert_eq!(moment(1, 1)?, 283.0);
    Ok(())
}

#[test]
fn test_central_moments() -> anyhow::Result<()> {
    let ops = service();
    let img = ramp();
    let expected = [
        ((1, 1), -38.405660377358494),
        ((2, 0), 200.76415094339623),
        ((0, 2), 132.46226415094338),
        ((3, 0), -11.421146315414802),
        ((0, 3), 9.998576005695982),
        ((2, 1), 30.915628337486663),
        ((1, 2), 9.550729797080809),
    ];
    for ((p, q), mu) in expected {
        let name = moments::central_name(p, q);
        assert_relative_eq!(float(ops.run(name, &args![img.clone()])?), mu, epsilon = 1e-9);
    }
    Ok(())
}

#[test]
fn test_normalized_central_moments() -> anyhow::Result<()> {
    let ops = service();
    let img = ramp();
    let expected = [
        ((1, 1), -0.003418090101224501),
        ((2, 0), 0.017867937962210416),
        ((0, 2), 0.01178909435305655),
        ((3, 0), -9.872906682161051e-05),
        ((0, 3), 8.643178638338441e-05),
        ((2, 1), 0.0002672473543084052),
        ((1, 2), 8.256042031949851e-05),
    ];
    for ((p, q), eta) in expected {
        let value = float(ops.run(normalized_name(p, q), &args![img.clone()])?);
        assert_relative_eq!(value, eta, max_relative = 1e-9);
    }
    Ok(())
}

#[test]
fn test_centroid() -> anyhow::Result<()> {
    let ops = service();
    let out = ops.run(CENTROID, &args![ramp()])?;
    let center = out.as_list().expect("two outputs");
    assert_relative_eq!(float(center[0].clone()), 217.0 / 106.0, epsilon = 1e-12);
    assert_relative_eq!(float(center[1].clone()), 157.0 / 106.0, epsilon = 1e-12);
    Ok(())
}

#[test]
fn test_moments_need_a_plane() {
    let ops = service();
    let volume = ArrayImg::new(&[2, 2, 2], SampleType::Float64).unwrap();
    let err = ops.run("moments.moment00", &args![volume]).unwrap_err();
    assert!(matches!(err, Error::Execution { .. }));
}

proptest! {
    #[test]
    fn prop_mean_within_range(values in prop::collection::vec(-1e3f64..1e3, 1..64)) {
        let ops = service();
        let len = values.len();
        let img = ArrayImg::from_data(&[len], ImgData::Float64(values)).unwrap();
        let handle = img.into_handle();
        let mean = float(ops.run(MEAN, &args![handle.clone()]).unwrap());
        let range = ops.run(MIN_MAX, &args![handle.clone()]).unwrap();
        let bounds = range.as_list().unwrap();
        prop_assert!(float(bounds[0].clone()) <= mean + 1e-9);
        prop_assert!(mean <= float(bounds[1].clone()) + 1e-9);
        let m4 = float(ops.run(MOMENT4_ABOUT_MEAN, &args![handle]).unwrap());
        prop_assert!(m4 >= 0.0);
    }
}
