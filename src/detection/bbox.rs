use super::Detection;

pub fn center_to_corners(center: [f32; 2], size: [f32; 2]) -> [f32; 4] {
    let x1 = center[0] - size[0] / 2.0;
    let y1 = center[1] - size[1] / 2.0;
    let x2 = center[0] + size[0] / 2.0;
    let y2 = center[1] + size[1] / 2.0;

    [x1, y1, x2, y2]
}

pub fn area(bbox: &[f32; 4]) -> f32 {
    (bbox[2] - bbox[0]).max(0.0) * (bbox[3] - bbox[1]).max(0.0)
}

/// Intersection over union of two corner-form boxes.
pub fn iou(a: &[f32; 4], b: &[f32; 4]) -> f32 {
    let ix1 = a[0].max(b[0]);
    let iy1 = a[1].max(b[1]);
    let ix2 = a[2].min(b[2]);
    let iy2 = a[3].min(b[3]);

    let inter = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
    if inter == 0.0 {
        return 0.0;
    }
    let union = area(a) + area(b) - inter;
    if union <= 0.0 {
        return 0.0;
    }
    inter / union
}

/// Greedy per-class NMS. Survivors come back in descending confidence,
/// capped at `max_detections`.
pub fn nms(mut detections: Vec<Detection>, iou_threshold: f32, max_detections: usize) -> Vec<Detection> {
    detections.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut suppressed = vec![false; detections.len()];
    let mut kept = Vec::new();

    for i in 0..detections.len() {
        if suppressed[i] {
            continue;
        }
        if kept.len() == max_detections {
            break;
        }
        kept.push(detections[i].clone());

        for j in (i + 1)..detections.len() {
            if suppressed[j] || detections[j].class_id != detections[i].class_id {
                continue;
            }
            if iou(&detections[i].bbox, &detections[j].bbox) > iou_threshold {
                suppressed[j] = true;
            }
        }
    }

    kept
}
