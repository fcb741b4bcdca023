use crate::event_model::Axis;

/// valuator 序号 -> 语义轴, 打开设备时根据轴标签建立一次
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValuatorMap {
    axes: Vec<Option<Axis>>,
}

impl ValuatorMap {
    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> Self {
        Self {
            axes: labels.iter().map(|l| axis_for_label(l.as_ref())).collect(),
        }
    }

    pub fn axis(&self, index: u16) -> Option<Axis> {
        self.axes.get(index as usize).copied().flatten()
    }
}

fn axis_for_label(label: &str) -> Option<Axis> {
    match label {
        "Abs MT Position X" => Some(Axis::PositionX),
        "Abs MT Position Y" => Some(Axis::PositionY),
        "Abs MT Pressure" => Some(Axis::Pressure),
        "Abs MT Touch Major" => Some(Axis::TouchMajor),
        "Abs MT Touch Minor" => Some(Axis::TouchMinor),
        "Abs MT Orientation" => Some(Axis::Orientation),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_to_axes() {
        let map = ValuatorMap::from_labels(&[
            "Abs MT Position X",
            "Abs MT Position Y",
            "Rel Vert Wheel",
            "Abs MT Touch Major",
            "Abs MT Pressure",
        ]);
        assert_eq!(map.axis(0), Some(Axis::PositionX));
        assert_eq!(map.axis(2), None);
        assert_eq!(map.axis(3), Some(Axis::TouchMajor));
        assert_eq!(map.axis(4), Some(Axis::Pressure));
        assert_eq!(map.axis(40), None);
    }
}
