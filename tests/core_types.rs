use iriscode::{ImageView, IrisError, IrisMask, IrisTemplate, NormalizedIris, OwnedImage};

#[test]
fn image_view_rejects_invalid_dimensions() {
    let data = [0u8; 4];

    let err = ImageView::from_slice(&data, 0, 1).err().unwrap();
    assert_eq!(
        err,
        IrisError::InvalidDimensions {
            width: 0,
            height: 1,
        }
    );

    let err = ImageView::from_slice(&data, 1, 0).err().unwrap();
    assert_eq!(
        err,
        IrisError::InvalidDimensions {
            width: 1,
            height: 0,
        }
    );
}

#[test]
fn image_view_rejects_invalid_stride_and_small_buffers() {
    let data = [0u8; 8];
    let err = ImageView::new(&data, 4, 1, 3).err().unwrap();
    assert_eq!(
        err,
        IrisError::InvalidStride {
            width: 4,
            stride: 3,
        }
    );

    let err = ImageView::new(&data[..3], 2, 2, 2).err().unwrap();
    assert_eq!(err, IrisError::BufferTooSmall { needed: 4, got: 3 });
}

#[test]
fn owned_image_copies_strided_rows() {
    let data: Vec<u8> = (0u8..12).collect();
    let view = ImageView::new(&data, 3, 3, 4).unwrap();
    assert_eq!(view.stride(), 4);
    let owned = OwnedImage::from_view(view).unwrap();
    assert_eq!(owned.view().stride(), 3);
    assert_eq!(owned.data(), &[0, 1, 2, 4, 5, 6, 8, 9, 10]);
    assert_eq!(owned.view().row(2).unwrap(), &[8, 9, 10]);
}

#[test]
fn normalized_iris_reports_geometry() {
    let norm = NormalizedIris::new(vec![7; 6], 2, 3).unwrap();
    assert_eq!(norm.radial_resolution(), 2);
    assert_eq!(norm.angular_resolution(), 3);
    assert_eq!(norm.len(), 6);
    assert!(NormalizedIris::new(vec![7; 5], 2, 3).is_err());
}

#[test]
fn mask_and_template_reject_wrong_lengths() {
    assert_eq!(
        IrisMask::new(vec![true; 5], 2, 3).unwrap_err(),
        IrisError::BufferTooSmall { needed: 6, got: 5 }
    );
    assert!(IrisMask::new(Vec::new(), 0, 3).is_err());
    assert!(IrisTemplate::from_bits(&[true; 10], 4, 1, 1).is_err());
    assert!(matches!(
        IrisTemplate::from_bits(&[], 0, 1, 1),
        Err(IrisError::FeatureExtractionFailure { .. })
    ));
}
