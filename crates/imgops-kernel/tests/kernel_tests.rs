use approx::assert_relative_eq;
use imgops_core::{args, ImgHandle, OpRegistry, OpService, SampleType, Value};
use imgops_kernel::{CreateGaussianKernel, CreateScaledGaussianKernel};

fn service() -> OpService {
    let mut registry = OpRegistry::new();
    imgops_kernel::register(&mut registry);
    OpService::new(registry).unwrap()
}

fn image(value: Value) -> ImgHandle {
    value.as_img().cloned().expect("image output")
}

#[test]
fn test_gauss_size_for_sigma_five() -> anyhow::Result<()> {
    let ops = service();
    let kernel = image(ops.run("gauss", &args![2, 5.0, SampleType::Float32, Value::Null])?);
    assert_eq!(kernel.dims(), vec![31, 31]);
    assert_eq!(kernel.sample_type(), SampleType::Float32);

    let sum: f64 = kernel.read().real_values().sum();
    assert_relative_eq!(sum, 1.0, epsilon = 1e-5);
    Ok(())
}

#[test]
fn test_log_size_for_radius_five() -> anyhow::Result<()> {
    let ops = service();
    let kernel = image(ops.run("log", &args![2, 5.0, SampleType::Float64, Value::Null])?);
    assert_eq!(kernel.dims(), vec![27, 27]);
    Ok(())
}

#[test]
fn test_output_type_selects_variant() -> anyhow::Result<()> {
    let ops = service();

    let float = ops.op("gauss", &args![1, 1.0, SampleType::Float64, Value::Null])?.expect("match");
    assert!(float.is::<CreateGaussianKernel>());

    let complex = ops
        .op("gauss", &args![1, 1.0, SampleType::ComplexFloat64, Value::Null])?
        .expect("match");
    assert!(complex.is::<CreateGaussianKernel>());

    let byte = ops.op("gauss", &args![1, 1.0, SampleType::UInt8, Value::Null])?.expect("match");
    assert!(byte.is::<CreateScaledGaussianKernel>());
    Ok(())
}

#[test]
fn test_scaled_kernel_peaks_at_255() -> anyhow::Result<()> {
    let ops = service();
    let kernel = image(ops.run("gauss", &args![1, 1.0, SampleType::UInt8, Value::Null])?);
    let values: Vec<f64> = kernel.read().real_values().collect();
    assert_eq!(values.len(), 7);
    assert_eq!(values[3], 255.0);
    assert!(values[0] < values[1] && values[1] < values[2]);
    Ok(())
}

#[test]
fn test_no_conforming_variant_fails() {
    // only the float variant registered
    let registry = OpRegistry::new().with(
        imgops_kernel::gauss::descriptors()
            .into_iter()
            .next()
            .expect("float variant"),
    );
    let ops = OpService::new(registry).unwrap();
    let err = ops
        .run("gauss", &args![2, 1.0, SampleType::UInt8, Value::Null])
        .unwrap_err();
    assert!(err.is_no_match());
    assert!(ops.run("gauss", &args![2, 1.0, SampleType::Float32, Value::Null]).is_ok());
}

#[test]
fn test_log_rejects_byte_output() {
    let ops = service();
    assert!(ops
        .run("log", &args![2, 3.0, SampleType::UInt8, Value::Null])
        .unwrap_err()
        .is_no_match());
}

#[test]
fn test_calibration_is_optional_and_positional() -> anyhow::Result<()> {
    let ops = service();
    let kernel = image(ops.run(
        "gauss",
        &args![2, 2.0, SampleType::Float64, vec![1.0, 2.0]],
    )?);
    assert_eq!(kernel.dims(), vec![13, 7]);

    let kernel = image(ops.run("gauss", &args![2, 2.0, SampleType::Float64, Value::Null])?);
    assert_eq!(kernel.dims(), vec![13, 13]);

    // the optional slot still has to be passed
    let err = ops
        .run("gauss", &args![2, 2.0, SampleType::Float64])
        .unwrap_err();
    assert!(err.is_no_match());
    Ok(())
}

#[test]
fn test_bad_calibration_length_fails_at_run() {
    let ops = service();
    let err = ops
        .run("gauss", &args![2, 2.0, SampleType::Float64, vec![1.0]])
        .unwrap_err();
    assert!(matches!(err, imgops_core::Error::Execution { .. }));
}

#[test]
fn test_negative_sigma_is_a_binding_error() {
    let ops = service();
    let err = ops
        .run("gauss", &args![2, -1.0, SampleType::Float64, Value::Null])
        .unwrap_err();
    assert!(matches!(err, imgops_core::Error::Binding { .. }));
}

#[test]
fn test_oversized_kernels_fail_without_panicking() {
    let ops = service();
    for (name, scale) in [("gauss", 1.0e6), ("log", 1.0e7)] {
        let err = ops
            .run(name, &args![3, scale, SampleType::Float64, Value::Null])
            .unwrap_err();
        assert!(
            matches!(
                err,
                imgops_core::Error::Execution { ref source, .. }
                    if matches!(**source, imgops_core::Error::InvalidParameter(_))
            ),
            "{name}: {err}"
        );
    }
}
