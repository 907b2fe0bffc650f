/// Finds candidate letter boundaries in a skeleton's column profile.
///
/// Scans from the last column towards column 0 (the script runs right to
/// left). Inside the window `[j, index]` a boundary is recorded at `j` when
/// the window is wider than `min_letter_width` and either
/// - columns `j` and `j - 1` are both empty, or
/// - column `j` holds more than `stroke_density` skeleton pixels.
///
/// An empty pair inside a narrow window restarts the window without
/// recording. Points come back in descending order and always end at 0:
/// see [`close_left_edge`].
pub fn find_split_points(profile: &[u32], min_letter_width: u32, stroke_density: u32) -> Vec<u32> {
    let mut points = Vec::new();
    let min_width = min_letter_width as i64;

    // Columns left of the profile count as empty
    let empty = |j: i64| j < 0 || profile[j as usize] == 0;

    let mut index = profile.len() as i64 - 1;
    while index > 0 {
        if profile[index as usize] > 0 {
            let mut j = index;
            while j >= 0 {
                if empty(j) && empty(j - 1) {
                    if index - j > min_width {
                        points.push(j as u32);
                    }
                    index = j;
                    break;
                }
                if profile[j as usize] > stroke_density && index - j > min_width {
                    points.push(j as u32);
                    index = j;
                    break;
                }
                j -= 1;
            }
        }
        index -= 1;
    }

    close_left_edge(points, min_letter_width)
}

/// Makes sure the leftmost segment reaches column 0.
///
/// No points means the whole crop is one segment. A last point within
/// half a letter of column 0 is moved onto it, merging the sliver into its
/// neighbour; otherwise an explicit 0 is appended.
pub fn close_left_edge(mut points: Vec<u32>, min_letter_width: u32) -> Vec<u32> {
    match points.last_mut() {
        None => points.push(0),
        Some(last) if *last <= min_letter_width / 2 => *last = 0,
        Some(_) => points.push(0),
    }
    points
}
