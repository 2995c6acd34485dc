use super::*;

fn gradient(w: u32, h: u32, seed: u32) -> DecodedImage {
    let luma = image::GrayImage::from_fn(w, h, |x, y| {
        image::Luma([((x * 7 + y * 3 + seed * 31) ^ (x * y + seed)) as u8])
    });
    DecodedImage::from_luma(luma).unwrap()
}

fn set(images: Vec<DecodedImage>) -> DecodedImageSet {
    DecodedImageSet::from_images(images)
}

struct ScriptedCompiler {
    progress: Vec<f64>,
    export: PanelResult<Vec<u8>>,
}

impl TargetCompiler for ScriptedCompiler {
    fn compile_image_targets(
        &mut self,
        _images: &[DecodedImage],
        on_progress: &mut dyn FnMut(f64),
    ) -> PanelResult<()> {
        for p in &self.progress {
            on_progress(*p);
        }
        Ok(())
    }

    fn export_data(&mut self) -> PanelResult<Vec<u8>> {
        std::mem::replace(&mut self.export, Ok(Vec::new()))
    }
}

#[test]
fn progress_is_monotonic_and_ends_at_100_once() {
    let mut compiler = ScriptedCompiler {
        progress: vec![10.0, 5.0, 40.4, f64::NAN, 130.0, 100.0],
        export: Ok(vec![1, 2, 3]),
    };
    let mut seen = Vec::new();
    let artifact = compile_targets(&mut compiler, &set(vec![gradient(8, 8, 1)]), &mut |p| {
        seen.push(p)
    })
    .unwrap();
    assert_eq!(seen, vec![10, 40, 100]);
    assert_eq!(artifact.as_bytes(), &[1, 2, 3]);
    assert_eq!(artifact.target_count(), 1);
}

#[test]
fn silent_compiler_still_reports_completion() {
    let mut compiler = ScriptedCompiler {
        progress: vec![],
        export: Ok(vec![9]),
    };
    let mut seen = Vec::new();
    compile_targets(&mut compiler, &set(vec![gradient(4, 4, 0)]), &mut |p| seen.push(p)).unwrap();
    assert_eq!(seen, vec![100]);
}

#[test]
fn empty_inputs_and_empty_exports_are_compile_failures() {
    let mut compiler = ScriptedCompiler {
        progress: vec![],
        export: Ok(vec![]),
    };
    let err = compile_targets(&mut compiler, &set(vec![]), &mut |_| {}).unwrap_err();
    assert!(matches!(err, PanelError::Compile(_)));

    let err = compile_targets(&mut compiler, &set(vec![gradient(4, 4, 0)]), &mut |_| {}).unwrap_err();
    assert!(matches!(err, PanelError::Compile(_)));
}

#[test]
fn compiler_errors_become_compile_failures() {
    let mut compiler = ScriptedCompiler {
        progress: vec![50.0],
        export: Err(PanelError::engine("worker crashed")),
    };
    let mut seen = Vec::new();
    let err = compile_targets(&mut compiler, &set(vec![gradient(4, 4, 0)]), &mut |p| seen.push(p))
        .unwrap_err();
    assert!(matches!(err, PanelError::Compile(ref m) if m.contains("worker crashed")));
    assert_eq!(seen, vec![50]);
}

#[test]
fn descriptor_artifact_is_index_aligned() {
    let images = set(vec![gradient(32, 20, 1), gradient(40, 40, 2), gradient(17, 33, 3)]);
    let mut compiler = DescriptorCompiler::new(CompileOpts::default());
    let artifact = compile_targets(&mut compiler, &images, &mut |_| {}).unwrap();

    let index = TargetIndex::parse(artifact.as_bytes()).unwrap();
    assert_eq!(index.len(), 3);
    assert_eq!((index.targets[0].width, index.targets[0].height), (32, 20));
    assert_eq!((index.targets[1].width, index.targets[1].height), (40, 40));
    assert_eq!((index.targets[2].width, index.targets[2].height), (17, 33));
    assert!(index.targets.iter().all(|t| t.descriptor.len() == 32));
}

#[test]
fn identical_images_fail_without_partial_artifact() {
    let images = set(vec![gradient(24, 24, 5), gradient(24, 24, 5)]);
    let mut compiler = DescriptorCompiler::new(CompileOpts::default());
    let err = compile_targets(&mut compiler, &images, &mut |_| {}).unwrap_err();
    assert!(matches!(err, PanelError::Compile(ref m) if m.contains("0 and 1")));
    assert!(compiler.export_data().is_err());
}

#[test]
fn descriptor_compiler_is_deterministic() {
    let images = set(vec![gradient(30, 30, 1), gradient(30, 30, 9)]);
    let mut a = DescriptorCompiler::new(CompileOpts::default());
    let mut b = DescriptorCompiler::new(CompileOpts::default());
    let x = compile_targets(&mut a, &images, &mut |_| {}).unwrap();
    let y = compile_targets(&mut b, &images, &mut |_| {}).unwrap();
    assert_eq!(x, y);
}

#[test]
fn target_index_rejects_truncated_buffers() {
    assert!(TargetIndex::parse(b"PCT1").is_err());
    assert!(TargetIndex::parse(b"XXXX\x01\0\0\0\x01\0\0\0").is_err());
    let mut bytes = b"PCT1".to_vec();
    bytes.extend_from_slice(&1u32.to_le_bytes());
    bytes.extend_from_slice(&2u32.to_le_bytes());
    bytes.extend_from_slice(&[0u8; 9]);
    assert!(TargetIndex::parse(&bytes).is_err());
}

#[test]
fn out_of_range_descriptor_side_is_a_compile_failure() {
    let images = set(vec![gradient(8, 8, 1)]);
    for side in [0, 1, CompileOpts::MAX_DESCRIPTOR_SIDE + 1, u32::MAX] {
        let mut compiler = DescriptorCompiler::new(CompileOpts {
            descriptor_side: side,
        });
        let err = compile_targets(&mut compiler, &images, &mut |_| {}).unwrap_err();
        assert!(
            matches!(err, PanelError::Compile(ref m) if m.contains("descriptor_side")),
            "side {side}: {err:?}"
        );
    }
}

#[test]
fn largest_descriptor_side_compiles() {
    let side = CompileOpts::MAX_DESCRIPTOR_SIDE;
    let mut compiler = DescriptorCompiler::new(CompileOpts {
        descriptor_side: side,
    });
    let artifact = compile_targets(&mut compiler, &set(vec![gradient(64, 48, 2)]), &mut |_| {})
        .unwrap();
    let index = TargetIndex::parse(artifact.as_bytes()).unwrap();
    assert_eq!(index.targets[0].descriptor.len(), (side * side / 8) as usize);
}
