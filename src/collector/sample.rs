use std::collections::HashMap;
use std::sync::Arc;

use prometheus::core::Desc;
use prometheus::proto::{self, LabelPair, MetricFamily, MetricType};
use tracing::warn;

use crate::device::LookupError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Counter,
    Gauge,
}

impl From<ValueType> for MetricType {
    fn from(t: ValueType) -> Self {
        match t {
            ValueType::Counter => MetricType::COUNTER,
            ValueType::Gauge => MetricType::GAUGE,
        }
    }
}

/// A metric family's static shape: name, help, label schema and kind.
#[derive(Debug)]
pub struct Descriptor {
    desc: Desc,
    value_type: ValueType,
}

impl Descriptor {
    pub fn new(
        name: &str,
        help: &str,
        labels: &[&str],
        value_type: ValueType,
    ) -> Result<Self, prometheus::Error> {
        let desc = Desc::new(
            name.to_string(),
            help.to_string(),
            labels.iter().map(|l| l.to_string()).collect(),
            HashMap::new(),
        )?;
        Ok(Self { desc, value_type })
    }

    #[inline(always)]
    pub fn desc(&self) -> &Desc {
        &self.desc
    }

    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.desc.fq_name
    }

    #[inline(always)]
    pub fn help(&self) -> &str {
        &self.desc.help
    }

    #[inline(always)]
    pub fn labels(&self) -> &[String] {
        &self.desc.variable_labels
    }

    #[inline(always)]
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }
}

/// One output of a collection cycle.
///
/// `Invalid` stands in for a whole descriptor when its values could not be
/// produced; it carries the cause instead of a value.
#[derive(Debug, Clone)]
pub enum Sample {
    Metric {
        desc: Arc<Descriptor>,
        value: f64,
        label_values: Vec<String>,
    },
    Invalid {
        desc: Arc<Descriptor>,
        error: Arc<LookupError>,
    },
}

impl Sample {
    pub fn new(desc: &Arc<Descriptor>, value: f64, label_values: Vec<String>) -> Self {
        debug_assert_eq!(desc.labels().len(), label_values.len());
        Sample::Metric {
            desc: Arc::clone(desc),
            value,
            label_values,
        }
    }

    pub fn invalid(desc: &Arc<Descriptor>, error: Arc<LookupError>) -> Self {
        Sample::Invalid {
            desc: Arc::clone(desc),
            error,
        }
    }

    #[inline]
    pub fn descriptor(&self) -> &Descriptor {
        match self {
            Sample::Metric { desc, .. } | Sample::Invalid { desc, .. } => desc.as_ref(),
        }
    }

    #[inline]
    pub fn value(&self) -> Option<f64> {
        match self {
            Sample::Metric { value, .. } => Some(*value),
            Sample::Invalid { .. } => None,
        }
    }

    #[inline]
    pub fn label_values(&self) -> &[String] {
        match self {
            Sample::Metric { label_values, .. } => label_values.as_slice(),
            Sample::Invalid { .. } => &[],
        }
    }

    #[inline]
    pub fn error(&self) -> Option<&LookupError> {
        match self {
            Sample::Metric { .. } => None,
            Sample::Invalid { error, .. } => Some(error.as_ref()),
        }
    }

    #[inline]
    pub fn is_invalid(&self) -> bool {
        matches!(self, Sample::Invalid { .. })
    }

    fn to_proto(&self) -> Option<proto::Metric> {
        let Sample::Metric {
            desc,
            value,
            label_values,
        } = self
        else {
            return None;
        };

        let mut m = proto::Metric::default();
        for (name, v) in desc.labels().iter().zip(label_values) {
            let mut lp = LabelPair::default();
            lp.set_name(name.clone());
            lp.set_value(v.clone());
            m.mut_label().push(lp);
        }
        match desc.value_type() {
            ValueType::Counter => {
                let mut c = proto::Counter::default();
                c.set_value(*value);
                m.set_counter(c);
            }
            ValueType::Gauge => {
                let mut g = proto::Gauge::default();
                g.set_value(*value);
                m.set_gauge(g);
            }
        }
        Some(m)
    }
}

/// Groups samples into one family per descriptor, in first-seen order.
///
/// Invalid markers are logged and dropped so the rest of the scrape is still
/// served. Families left without metrics are omitted.
pub fn families(samples: &[Sample]) -> Vec<MetricFamily> {
    let mut out: Vec<MetricFamily> = vec![];

    for sample in samples {
        let desc = sample.descriptor();
        let idx = match out.iter().position(|mf| mf.get_name() == desc.name()) {
            Some(idx) => idx,
            None => {
                let mut mf = MetricFamily::default();
                mf.set_name(desc.name().to_string());
                mf.set_help(desc.help().to_string());
                mf.set_field_type(desc.value_type().into());
                out.push(mf);
                out.len() - 1
            }
        };

        match sample.to_proto() {
            Some(m) => out[idx].mut_metric().push(m),
            None => {
                if let Some(e) = sample.error() {
                    warn!("collected invalid metric {}: {}", desc.name(), e);
                }
            }
        }
    }

    out.retain(|mf| !mf.get_metric().is_empty());
    out
}
