//! The bundled dataset used whenever the gateway has nothing to offer.

use crate::model::{Flora, Fort};
use std::collections::BTreeSet;
use std::sync::OnceLock;

const FORT_IMAGE: &str = "https://images.unsplash.com/photo-1506905925346-21bda4d32df4?w=600&q=80";
const FLORA_IMAGE: &str = "https://images.unsplash.com/photo-1502082553048-f009c37129b9?w=600&q=80";

#[allow(clippy::too_many_arguments)]
fn fort(
    id: i64,
    name: &str,
    district: &str,
    height: i32,
    best_time: &str,
    history: &str,
    latitude: f64,
    longitude: f64,
) -> Fort {
    Fort {
        id,
        name: name.to_string(),
        district: district.to_string(),
        height,
        best_time: best_time.to_string(),
        history: history.to_string(),
        image_url: FORT_IMAGE.to_string(),
        latitude: Some(latitude),
        longitude: Some(longitude),
    }
}

fn plant(id: i64, name: &str, scientific_name: &str, fort_id: i64, medicinal_use: &str, description: &str) -> Flora {
    Flora {
        id,
        name: name.to_string(),
        scientific_name: scientific_name.to_string(),
        fort_id: Some(fort_id),
        medicinal_use: medicinal_use.to_string(),
        description: description.to_string(),
        image_url: FLORA_IMAGE.to_string(),
    }
}

/// Seed forts, in id order.
pub fn forts() -> &'static [Fort] {
    static FORTS: OnceLock<Vec<Fort>> = OnceLock::new();
    FORTS.get_or_init(|| {
        vec![
            fort(
                1,
                "Raigad Fort",
                "Raigad",
                820,
                "October – February",
                "Capital of the Maratha Empire under Chhatrapati Shivaji Maharaj, who was crowned here in 1674. \
                 The fort is reached by a long stairway or a ropeway and holds the Maharaj's samadhi, \
                 the Hirkani buruj and the remains of the royal court.",
                18.2337,
                73.4402,
            ),
            fort(
                2,
                "Sinhagad Fort",
                "Pune",
                1312,
                "June – February",
                "Known earlier as Kondhana, the fort was taken in 1670 by Tanaji Malusare in a night assault \
                 up its western cliff. Tanaji fell in the battle and the fort was renamed in his honour.",
                18.3664,
                73.7556,
            ),
            fort(
                3,
                "Rajgad Fort",
                "Pune",
                1376,
                "June – March",
                "The first capital of Shivaji Maharaj for more than twenty-five years. \
                 Its three machis, Padmavati, Suvela and Sanjivani, make it one of the largest hill forts in the Sahyadri.",
                18.2466,
                73.6825,
            ),
            fort(
                4,
                "Pratapgad Fort",
                "Satara",
                1080,
                "October – March",
                "Built in 1656, Pratapgad is remembered for the 1659 battle in which Shivaji Maharaj defeated \
                 Afzal Khan of the Adilshahi army at the foot of the fort.",
                17.9361,
                73.5786,
            ),
            fort(
                5,
                "Shivneri Fort",
                "Pune",
                1067,
                "July – February",
                "Birthplace of Chhatrapati Shivaji Maharaj in 1630. The fort has seven gates, \
                 rock-cut Buddhist caves on its slopes and the Shivai Devi temple after which he was named.",
                19.1990,
                73.8597,
            ),
            fort(
                6,
                "Murud-Janjira",
                "Raigad",
                0,
                "November – February",
                "An island fortress off the Konkan coast held by the Siddis, who resisted Maratha, Portuguese \
                 and English sieges for centuries. Its 22 bastions still carry heavy cannon.",
                18.3000,
                72.9643,
            ),
            fort(
                7,
                "Sindhudurg Fort",
                "Sindhudurg",
                0,
                "November – March",
                "A sea fort built by Shivaji Maharaj between 1664 and 1667 on Kurte island off Malvan, \
                 with foundation stones set in lead. It is one of the few forts with a temple to the Maharaj.",
                16.0422,
                73.4611,
            ),
            fort(
                8,
                "Lohagad Fort",
                "Pune",
                1033,
                "June – September",
                "A hill fort near Lonavala that changed hands between the Satavahanas, Yadavas, Bahamanis, \
                 Nizamshahi, Mughals and Marathas. Its Vinchukata spur is a favourite monsoon trek.",
                18.7094,
                73.4856,
            ),
            fort(
                9,
                "Torna Fort",
                "Pune",
                1403,
                "June – December",
                "The first fort captured by Shivaji Maharaj, at the age of sixteen, in 1646. \
                 Treasure found during its repair funded the construction of Rajgad nearby.",
                18.2763,
                73.6228,
            ),
            fort(
                10,
                "Harishchandragad",
                "Ahmednagar",
                1424,
                "August – February",
                "An ancient hill fort dating back to the 6th century with the Harishchandreshwar temple, \
                 the Kedareshwar cave and the concave Konkan Kada cliff that overlooks the Konkan plains.",
                19.3867,
                73.7792,
            ),
        ]
    })
}

/// Seed plants, in id order.
pub fn flora() -> &'static [Flora] {
    static FLORA: OnceLock<Vec<Flora>> = OnceLock::new();
    FLORA.get_or_init(|| {
        vec![
            plant(
                1,
                "Karvi",
                "Strobilanthes callosa",
                2,
                "Leaves are used in folk remedies for swelling and joint pain.",
                "A shrub that carpets the Sahyadri slopes and flowers en masse once every seven to eight years.",
            ),
            plant(
                2,
                "Jambhul",
                "Syzygium cumini",
                1,
                "Seeds are a traditional remedy for controlling blood sugar.",
                "A tall evergreen tree with purple fruit that ripens at the start of the monsoon.",
            ),
            plant(
                3,
                "Shatavari",
                "Asparagus racemosus",
                3,
                "Roots are an Ayurvedic tonic for digestion and women's health.",
                "A climbing plant with needle-like leaves and small white flowers.",
            ),
            plant(
                4,
                "Kokum",
                "Garcinia indica",
                7,
                "Fruit rind aids digestion and is used against acidity and heatstroke.",
                "A coastal tree of the Konkan whose dried rind gives sol kadhi its colour.",
            ),
            plant(
                5,
                "Hirda",
                "Terminalia chebula",
                8,
                "Dried fruit is one of the three fruits of triphala.",
                "A deciduous tree common on the forested slopes of the northern Sahyadri.",
            ),
            plant(
                6,
                "Ain",
                "Terminalia elliptica",
                4,
                "Bark is used to treat wounds and diarrhoea.",
                "A large tree with crocodile-skin bark, host to the tasar silkworm.",
            ),
            plant(
                7,
                "Pandanus",
                "Pandanus odorifer",
                6,
                "Flower extract is used in headache and earache remedies.",
                "A salt-tolerant screw pine with stilt roots that grows along the Konkan shore.",
            ),
            plant(
                8,
                "Sita Ashok",
                "Saraca asoca",
                5,
                "Bark is a classical remedy for menstrual disorders.",
                "A sacred evergreen tree with clusters of orange-red flowers.",
            ),
            plant(
                9,
                "Kumbha",
                "Careya arborea",
                9,
                "Bark paste is applied to boils and skin eruptions.",
                "A deciduous tree whose large leaves turn red before falling.",
            ),
            plant(
                10,
                "Bhui Amla",
                "Phyllanthus niruri",
                10,
                "The whole plant is used for liver and kidney ailments.",
                "A small herb that grows in open ground after the first rains.",
            ),
        ]
    })
}

/// Districts of the seed forts, sorted and without repeats.
pub fn districts() -> Vec<String> {
    districts_of(forts())
}

/// Districts of any fort list, sorted and without repeats.
pub fn districts_of(forts: &[Fort]) -> Vec<String> {
    forts
        .iter()
        .map(|fort| fort.district.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
