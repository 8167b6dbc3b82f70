//! The fixed set of worker agents and what each one can do.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum_macros::{Display, EnumIter, EnumString};

use crate::agent::WorkerAgent;
use crate::config::WorkflowSettings;
use crate::prompt_template::{HOTEL_PROMPT, ITINERARY_PROMPT, TRANSPORT_PROMPT};
use crate::providers::base::Provider;
use crate::services::ServiceClients;
use crate::toolkits::arithmetic::ArithmeticToolkit;
use crate::toolkits::currency::CurrencyToolkit;
use crate::toolkits::expenses::ExpensesToolkit;
use crate::toolkits::flights::FlightsToolkit;
use crate::toolkits::hotels::HotelsToolkit;
use crate::toolkits::places::PlacesToolkit;
use crate::toolkits::weather::WeatherToolkit;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
pub enum WorkerKind {
    TransportAgent,
    HotelAgent,
    ItineraryAgent,
}

impl WorkerKind {
    /// Capability description shown to the supervisor
    pub fn description(&self) -> &'static str {
        match self {
            WorkerKind::TransportAgent => {
                "Finds flights and approximate fares between cities for specific dates."
            }
            WorkerKind::HotelAgent => {
                "Checks hotel availability and room rates in a city for specific dates."
            }
            WorkerKind::ItineraryAgent => {
                "Creates day-by-day travel plans and answers questions about weather, \
                 attractions, restaurants, activities, local transport, currency and budgets."
            }
        }
    }

    pub(crate) fn prompt_template(&self) -> &'static str {
        match self {
            WorkerKind::TransportAgent => TRANSPORT_PROMPT,
            WorkerKind::HotelAgent => HOTEL_PROMPT,
            WorkerKind::ItineraryAgent => ITINERARY_PROMPT,
        }
    }
}

/// A worker's name and capability, as rendered into the supervisor prompt
#[derive(Debug, Clone, Serialize)]
pub struct WorkerInfo {
    pub name: String,
    pub description: String,
}

/// Worker agents keyed by kind; fixed once built
pub struct AgentRegistry {
    agents: Vec<WorkerAgent>,
}

impl AgentRegistry {
    /// Build the three travel workers around one provider and the shared service clients
    pub fn new(
        provider: Arc<dyn Provider>,
        services: &ServiceClients,
        settings: &WorkflowSettings,
    ) -> Self {
        let worker = |kind| {
            WorkerAgent::new(kind, provider.clone())
                .with_limits(settings.max_tool_rounds, settings.tool_timeout())
        };

        let mut transport = worker(WorkerKind::TransportAgent);
        transport.add_toolkit(Box::new(FlightsToolkit::new(services.amadeus.clone())));
        transport.add_toolkit(Box::new(CurrencyToolkit::new(services.currency.clone())));
        transport.add_toolkit(Box::new(ArithmeticToolkit::new()));

        let mut hotel = worker(WorkerKind::HotelAgent);
        hotel.add_toolkit(Box::new(HotelsToolkit::new(services.amadeus.clone())));
        hotel.add_toolkit(Box::new(ExpensesToolkit::new()));
        hotel.add_toolkit(Box::new(CurrencyToolkit::new(services.currency.clone())));

        let mut itinerary = worker(WorkerKind::ItineraryAgent);
        itinerary.add_toolkit(Box::new(WeatherToolkit::new(services.weather.clone())));
        itinerary.add_toolkit(Box::new(PlacesToolkit::new(services.places.clone())));
        itinerary.add_toolkit(Box::new(ExpensesToolkit::new()));
        itinerary.add_toolkit(Box::new(CurrencyToolkit::new(services.currency.clone())));
        itinerary.add_toolkit(Box::new(ArithmeticToolkit::new()));

        Self::from_agents(vec![transport, hotel, itinerary])
    }

    /// Build from prepared workers; a later worker of the same kind replaces an earlier one
    pub fn from_agents(agents: Vec<WorkerAgent>) -> Self {
        let mut registry = Self { agents: Vec::new() };
        for agent in agents {
            registry.agents.retain(|existing| existing.kind() != agent.kind());
            registry.agents.push(agent);
        }
        registry
    }

    pub fn get(&self, kind: WorkerKind) -> Option<&WorkerAgent> {
        self.agents.iter().find(|agent| agent.kind() == kind)
    }

    pub fn workers(&self) -> Vec<WorkerInfo> {
        self.agents
            .iter()
            .map(|agent| WorkerInfo {
                name: agent.kind().to_string(),
                description: agent.kind().description().to_string(),
            })
            .collect()
    }
}
