/// One editable invoice row. Numeric fields keep the raw text the user typed;
/// coercion happens in the totals engine.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineItem {
    pub id: u32,
    pub description: String,
    pub unit_price: String,
    pub quantity: String,
}

impl LineItem {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn field(&self, field: LineItemField) -> &str {
        match field {
            LineItemField::Description => &self.description,
            LineItemField::UnitPrice => &self.unit_price,
            LineItemField::Quantity => &self.quantity,
        }
    }

    pub fn field_mut(&mut self, field: LineItemField) -> &mut String {
        match field {
            LineItemField::Description => &mut self.description,
            LineItemField::UnitPrice => &mut self.unit_price,
            LineItemField::Quantity => &mut self.quantity,
        }
    }
}

// Editable columns of a row, in tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineItemField {
    Description,
    UnitPrice,
    Quantity,
}

impl LineItemField {
    pub fn next(self) -> Option<Self> {
        match self {
            LineItemField::Description => Some(LineItemField::UnitPrice),
            LineItemField::UnitPrice => Some(LineItemField::Quantity),
            LineItemField::Quantity => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LineItemField::Description => "Description",
            LineItemField::UnitPrice => "Unit Price",
            LineItemField::Quantity => "Qty",
        }
    }
}
