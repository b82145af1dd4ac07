use std::fmt;
use std::str::FromStr;

/// REST collections exposed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Customers,
    Orders,
    Notifications,
    DyeRecipes,
    ProductionCards,
    RefakatCards,
    Maintenance,
    MaintenancePlans,
    QualityReports,
    SampleCards,
    Roles,
    Permissions,
}

impl Resource {
    pub const ALL: [Resource; 12] = [
        Resource::Customers,
        Resource::Orders,
        Resource::Notifications,
        Resource::DyeRecipes,
        Resource::ProductionCards,
        Resource::RefakatCards,
        Resource::Maintenance,
        Resource::MaintenancePlans,
        Resource::QualityReports,
        Resource::SampleCards,
        Resource::Roles,
        Resource::Permissions,
    ];

    /// Collection path, e.g. `/api/customers`.
    pub fn path(&self) -> &'static str {
        match self {
            Resource::Customers => "/api/customers",
            Resource::Orders => "/api/orders",
            Resource::Notifications => "/api/notifications",
            Resource::DyeRecipes => "/api/dye-recipes",
            Resource::ProductionCards => "/api/production-tracking/production-cards",
            Resource::RefakatCards => "/api/production-tracking/refakat-cards",
            Resource::Maintenance => "/api/maintenance",
            Resource::MaintenancePlans => "/api/maintenance/plans",
            Resource::QualityReports => "/api/quality-control/reports",
            Resource::SampleCards => "/api/sample-cards",
            Resource::Roles => "/api/roles",
            Resource::Permissions => "/api/permissions",
        }
    }

    /// Path of one record.
    pub fn item_path(&self, id: i64) -> String {
        format!("{}/{}", self.path(), id)
    }

    /// Canonical CLI name.
    pub fn name(&self) -> &'static str {
        match self {
            Resource::Customers => "customers",
            Resource::Orders => "orders",
            Resource::Notifications => "notifications",
            Resource::DyeRecipes => "dye-recipes",
            Resource::ProductionCards => "production-cards",
            Resource::RefakatCards => "refakat-cards",
            Resource::Maintenance => "maintenance",
            Resource::MaintenancePlans => "maintenance-plans",
            Resource::QualityReports => "quality-reports",
            Resource::SampleCards => "sample-cards",
            Resource::Roles => "roles",
            Resource::Permissions => "permissions",
        }
    }

    /// Display title used in table headers.
    pub fn title(&self) -> &'static str {
        match self {
            Resource::Customers => "Müşteriler",
            Resource::Orders => "Siparişler",
            Resource::Notifications => "Bildirimler",
            Resource::DyeRecipes => "Boya Reçeteleri",
            Resource::ProductionCards => "Üretim Kartları",
            Resource::RefakatCards => "Refakat Kartları",
            Resource::Maintenance => "Bakım Talepleri",
            Resource::MaintenancePlans => "Bakım Planları",
            Resource::QualityReports => "Kalite Raporları",
            Resource::SampleCards => "Numune Kartları",
            Resource::Roles => "Roller",
            Resource::Permissions => "Yetkiler",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Resource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        let resource = match normalized.as_str() {
            "customers" | "customer" | "musteri" | "müşteri" | "musteriler" | "müşteriler" => {
                Resource::Customers
            }
            "orders" | "order" | "siparis" | "sipariş" | "siparisler" | "siparişler" => {
                Resource::Orders
            }
            "notifications" | "notification" | "bildirim" | "bildirimler" => {
                Resource::Notifications
            }
            "dye-recipes" | "dye-recipe" | "recipes" | "recete" | "reçete" => Resource::DyeRecipes,
            "production-cards" | "production-card" | "uretim" | "üretim" => {
                Resource::ProductionCards
            }
            "refakat-cards" | "refakat-card" | "refakat" => Resource::RefakatCards,
            "maintenance" | "maintenance-requests" | "bakim" | "bakım" => Resource::Maintenance,
            "maintenance-plans" | "maintenance-plan" | "plans" => Resource::MaintenancePlans,
            "quality-reports" | "quality-report" | "quality" | "kalite" => {
                Resource::QualityReports
            }
            "sample-cards" | "sample-card" | "samples" | "numune" => Resource::SampleCards,
            "roles" | "role" | "rol" | "roller" => Resource::Roles,
            "permissions" | "permission" | "yetki" | "yetkiler" => Resource::Permissions,
            _ => {
                let known: Vec<_> = Resource::ALL.iter().map(|r| r.name()).collect();
                return Err(format!(
                    "Unknown resource '{}'. Known resources: {}",
                    s,
                    known.join(", ")
                ));
            }
        };
        Ok(resource)
    }
}
